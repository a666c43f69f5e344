use anyhow::{Context, Result};

use super::{get_token, get_token_from_env, store_token, CredentialError};

/// Prompts user to enter the sheet-bridge token
pub fn prompt_for_token() -> Result<String> {
    println!("Sheet bridge token required.");
    println!("Your class rep generates one when setting up the shared sheet;");
    println!("ask them for it. Submissions and admin operations send it as a bearer token.");
    println!();

    let token = rpassword::prompt_password("Enter token: ")
        .context("Failed to read token from stdin")?;

    let token = token.trim();

    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    Ok(token.to_string())
}

/// Setup token if missing - prompts for token on first submit
/// Returns the token (env override, existing keyring entry, or newly stored)
pub async fn setup_token_if_missing() -> Result<String> {
    // Env var wins so CI and shared machines never touch the keyring
    if let Some(token) = get_token_from_env() {
        return Ok(token);
    }

    match get_token().await {
        Ok(token) => Ok(token),
        Err(CredentialError::TokenNotFound) => {
            let token = prompt_for_token()?;

            store_token(token.clone())
                .await
                .context("Failed to store token in keyring")?;

            println!("Token stored securely in system keyring.");

            Ok(token)
        }
        Err(CredentialError::KeyringUnavailable(msg)) => {
            anyhow::bail!(
                "System keyring unavailable. bunkwise needs a secure keyring \
                (macOS Keychain, Windows Credential Store, or Linux Secret Service), \
                or set {} instead.\nError: {}",
                super::ENV_TOKEN_VAR,
                msg
            );
        }
        Err(e) => {
            anyhow::bail!("Failed to access keyring: {}", e);
        }
    }
}

/// Prompt for the class-rep admin code and check it against the configured
/// one. The code never echoes.
pub fn prompt_admin_code(expected: &str) -> Result<bool> {
    let entered = rpassword::prompt_password("Enter admin code: ")
        .context("Failed to read admin code from stdin")?;
    Ok(entered.trim() == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_var_short_circuits_keyring_and_trims() {
        std::env::set_var(super::super::ENV_TOKEN_VAR, "  env-token-xyz  ");
        let token = setup_token_if_missing().await.unwrap();
        assert_eq!(token, "env-token-xyz");
        std::env::remove_var(super::super::ENV_TOKEN_VAR);
        assert_eq!(get_token_from_env(), None);
    }
}
