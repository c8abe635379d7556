//! Register command - create a new user

use anyhow::{bail, Result};
use dialoguer::{Input, Password};

use bankline_core::CredentialStore;

use super::{get_context, report, Credentials};
use crate::output;

pub fn run(credentials: &Credentials, json: bool) -> Result<()> {
    let username = match &credentials.username {
        Some(u) => u.clone(),
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = match &credentials.password {
        Some(p) => p.clone(),
        None => {
            let p1 = Password::new().with_prompt("Password").interact()?;
            let p2 = Password::new().with_prompt("Confirm password").interact()?;
            if p1 != p2 {
                bail!("Passwords do not match");
            }
            p1
        }
    };

    let ctx = get_context()?;
    let result = ctx.credential_service.register(&username, &password);

    report(json, result, |user| {
        output::success(&format!("User '{}' registered", user.username));
        println!("  User ID: {}", user.id);
    })
}
