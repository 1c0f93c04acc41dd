//! The `meetquiz user` command.

use anyhow::Result;

use super::{Paths, Workspace};

pub async fn execute(paths: &Paths, username: &str) -> Result<()> {
    let ws = Workspace::open(paths).await?;
    let user = ws.offline_engine().get_user(username).await?;

    println!("User:    {}", user.username);
    println!("Score:   {}", user.score);
    println!("Credits: {}", user.credits);
    Ok(())
}
