//
//  bosh-cli
//  interactive/prompt.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive Prompts Module
//!
//! Thin wrappers over `dialoguer` for the few questions the CLI asks: client
//! credentials during `log-in` and confirmation before destructive
//! operations.
//!
//! # Example
//!
//! ```no_run
//! use bosh_cli::interactive::prompt::{confirm_operation, prompt_input};
//!
//! let client = prompt_input("Client").unwrap();
//! if confirm_operation("Delete deployment 'dep'?", false).unwrap() {
//!     println!("Deleting");
//! }
//! ```

use anyhow::Result;
use dialoguer::{Confirm, Input, Password};

pub fn prompt_input(message: &str) -> Result<String> {
    let input: String = Input::new().with_prompt(message).interact_text()?;
    Ok(input)
}

/// Prompts for a secret without echoing it.
pub fn prompt_password(message: &str) -> Result<String> {
    let password = Password::new().with_prompt(message).interact()?;
    Ok(password)
}

pub fn prompt_confirm_with_default(message: &str, default: bool) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(confirmed)
}

/// Asks before a destructive operation.
///
/// # Parameters
///
/// * `message` - The question shown to the user
/// * `non_interactive` - Skip the question and proceed
///
/// # Returns
///
/// `Ok(true)` when the operation should go ahead. Without a terminal on
/// stdin the question cannot be asked, and the operation is refused unless
/// `non_interactive` is set.
pub fn confirm_operation(message: &str, non_interactive: bool) -> Result<bool> {
    if non_interactive {
        return Ok(true);
    }
    if !console::user_attended() {
        anyhow::bail!("Cannot ask for confirmation without a terminal. Use '--non-interactive' to proceed");
    }
    prompt_confirm_with_default(message, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_always_proceeds() {
        assert!(confirm_operation("Delete?", true).unwrap());
    }
}
