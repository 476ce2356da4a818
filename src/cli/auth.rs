//! CLI auth command handlers for login, status, logout, and refresh.

use std::io::Write;

use crate::auth::{CredentialStore, FlowState};

use super::Context;

/// Handle `tubelink auth login`.
pub async fn handle_login(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let service = ctx.auth_service()?;
    if service.is_logged_in() {
        println!("✅ Already logged in. Run `tubelink auth logout` to switch accounts.");
        return Ok(());
    }

    let controller = service.controller();
    let mut states = controller.watch_state();
    let Some(task) = controller.sign_in() else {
        return Err("a sign-in is already in progress".into());
    };

    println!("⏳ Requesting device code...");
    let mut prompted = false;
    let outcome = loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break controller.state();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                controller.dispose();
                eprintln!();
                break FlowState::Idle;
            }
        }
        let state = states.borrow_and_update().clone();
        if state.is_terminal() {
            break state;
        }
        if let Some(prompt) = state.prompt() {
            if !prompted {
                println!("🔗 Visit: {}", prompt.verification_url);
                println!("📋 Enter code: {}", prompt.user_code);
                prompted = true;
            }
            eprint!(
                "\r⏳ Waiting for authorization... code expires in {:>4}s",
                prompt.remaining_secs
            );
            let _ = std::io::stderr().flush();
        }
    };
    let _ = task.await;
    if prompted {
        eprintln!();
    }

    match outcome {
        FlowState::Succeeded => {
            println!("✅ Successfully logged in!");
            Ok(())
        }
        FlowState::Expired => Err("device code expired, please try again".into()),
        FlowState::Failed { message } => Err(format!("authorization failed: {message}").into()),
        _ => {
            println!("Sign-in cancelled");
            Ok(())
        }
    }
}

/// Handle `tubelink auth status`.
pub async fn handle_status(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.store();
    match store.load()? {
        Some(credential) => {
            println!("✅ Logged in");
            println!(
                "   Refresh token: {}",
                if credential.refresh_token.is_some() {
                    "stored"
                } else {
                    "missing"
                }
            );
        }
        None => println!("❌ Not logged in"),
    }
    println!("   Credential file: {}", store.path().display());
    Ok(())
}

/// Handle `tubelink auth logout`.
pub async fn handle_logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.store().clear()?;
    println!("✅ Signed out");
    Ok(())
}

/// Handle `tubelink auth refresh`.
pub async fn handle_refresh(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.auth_service()?.refresh_access_token().await?;
    println!("✅ Access token refreshed");
    Ok(())
}
