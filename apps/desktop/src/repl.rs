//! Interactive command loop: typed intents in, rendered view out.

use anyhow::{bail, Result};
use client_core::{ControllerError, ControllerHandle, FormInput, ViewState};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::watch,
};
use tracing::debug;

use crate::{
    input::{parse_command, validate_form, Command, HELP},
    view::render,
};

pub async fn run<R, W>(handle: &ControllerHandle, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(render(&handle.snapshot()).as_bytes()).await?;
    output.write_all(b"> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_command(&line) {
            Ok(None) => None,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => Some(HELP.to_string()),
            Ok(Some(command)) => Some(execute(handle, command).await?),
            Err(error) => Some(error.to_string()),
        };
        if let Some(reply) = reply {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.write_all(b"> ").await?;
        output.flush().await?;
    }

    Ok(())
}

/// Applies one command and returns the text to show for it.
pub async fn execute(handle: &ControllerHandle, command: Command) -> Result<String> {
    let state = handle.snapshot();
    let state = match command {
        Command::Login => {
            if state.is_signed_in() {
                return Ok("Already signed in.".to_string());
            }
            dispatch_and_settle(handle, ControllerHandle::login, |state| {
                state.is_signed_in() || state.login_error.is_some()
            })
            .await?
        }
        Command::Logout => {
            if !state.is_signed_in() {
                return Ok("Not signed in.".to_string());
            }
            dispatch_and_settle(handle, ControllerHandle::logout, |state| {
                !state.is_signed_in() || state.logout_error.is_some()
            })
            .await?
        }
        Command::Company(value) => {
            if !state.is_signed_in() {
                return Ok("Log in first.".to_string());
            }
            let expected = value.clone();
            dispatch_and_settle(handle, |h| h.edit_company_name(value), |state| {
                state.form.company_name == expected
            })
            .await?
        }
        Command::Website(value) => {
            if !state.is_signed_in() {
                return Ok("Log in first.".to_string());
            }
            let expected = value.clone();
            dispatch_and_settle(handle, |h| h.edit_website_url(value), |state| {
                state.form.website_url == expected
            })
            .await?
        }
        Command::Submit => {
            if !state.is_signed_in() {
                return Ok("Log in first.".to_string());
            }
            if state.is_loading {
                return Ok("A request is already in progress.".to_string());
            }
            if let Err(error) = validate_form(&state.form) {
                return Ok(error.to_string());
            }
            submit_and_settle(handle, &state.form).await?
        }
        Command::Show => state,
        Command::Help | Command::Quit => return Ok(HELP.to_string()),
    };
    Ok(render(&state))
}

/// Submits `form` and waits for its outcome.
pub async fn submit_and_settle(handle: &ControllerHandle, form: &FormInput) -> Result<ViewState> {
    let started_after = handle.snapshot().generation();
    handle.submit(form.company_name.clone(), form.website_url.clone())?;
    Ok(handle
        .wait_for(|state| state.generation() > started_after && !state.is_loading)
        .await?)
}

/// Sends an intent and waits for the first later snapshot matching `settled`.
pub async fn dispatch_and_settle<F>(
    handle: &ControllerHandle,
    dispatch: F,
    mut settled: impl FnMut(&ViewState) -> bool,
) -> Result<ViewState>
where
    F: FnOnce(&ControllerHandle) -> Result<(), ControllerError>,
{
    let mut snapshots: watch::Receiver<ViewState> = handle.watch();
    let _ = snapshots.borrow_and_update();
    dispatch(handle)?;

    loop {
        if snapshots.changed().await.is_err() {
            bail!("view controller stopped");
        }
        let state = snapshots.borrow_and_update().clone();
        if settled(&state) {
            return Ok(state);
        }
        debug!("waiting for controller to settle");
    }
}

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
