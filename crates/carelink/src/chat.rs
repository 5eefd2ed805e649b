// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `carelink chat` - interactive chat loop over a session.

use std::str::FromStr;
use std::time::Duration;

use carelink_chat::{ChatSession, ChatTarget, SessionOptions, WindowPolicy};
use carelink_config::CarelinkConfig;
use carelink_core::error::CarelinkError;
use carelink_core::types::{ChatMessage, SenderRole};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config: &CarelinkConfig, target: ChatTarget) -> Result<(), CarelinkError> {
    let self_id = config
        .app
        .user_id
        .clone()
        .ok_or_else(|| CarelinkError::Config("app.user_id must be set to chat".into()))?;
    let self_role = SenderRole::from_str(&config.app.user_role)
        .map_err(|_| CarelinkError::Config(format!("invalid app.user_role `{}`", config.app.user_role)))?;

    let client = crate::build_client(config)?;
    let session = ChatSession::new(
        client.clone(),
        client,
        SessionOptions {
            poll_interval: Duration::from_secs(config.chat.poll_interval_secs),
            window: WindowPolicy {
                before_minutes: config.chat.window_before_minutes,
                after_minutes: config.chat.window_after_minutes,
            },
            self_id: self_id.clone(),
            self_role,
        },
    );

    let verdict = session.open(target).await?;
    println!("{}", verdict.time_message);
    if !verdict.can_chat {
        return Ok(());
    }

    println!("Type a message and press enter. Empty line refreshes, /quit leaves.");
    print_thread(&session.messages().await, &self_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                session.close().await;
                return Err(CarelinkError::Internal(format!("stdin read failed: {err}")));
            }
        };

        match line.trim() {
            "/quit" => break,
            "" => session.poll().await,
            content => {
                if let Err(err) = session.send(content).await {
                    match err {
                        CarelinkError::SendFailed { content, source } => {
                            // The draft is preserved for the user to retry.
                            eprintln!("send failed ({source}), your message was: {content}");
                        }
                        other => eprintln!("send rejected: {other}"),
                    }
                }
            }
        }
        print_thread(&session.messages().await, &self_id);
    }

    session.close().await;
    Ok(())
}

fn print_thread(messages: &[ChatMessage], self_id: &str) {
    for message in messages {
        let who = if message.sender_id == self_id {
            "you"
        } else {
            "them"
        };
        let pending = if message.is_temp() { " (sending...)" } else { "" };
        let when = message.created_at.as_deref().unwrap_or("-");
        println!("[{when}] {who}: {}{pending}", message.content);
    }
    println!("---");
}
