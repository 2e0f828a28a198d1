//! Line-oriented chat REPL.
//!
//! One send is in flight at a time by construction: the loop blocks on the
//! reply before reading the next line of input.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use aura_ai::{ChatMessage, ChatOptions, ChatRole, ChatSession, GeminiClient};

pub async fn run_chat(client: GeminiClient, options: ChatOptions) -> Result<()> {
    println!("Chat with Aura. Type /quit to leave.");
    println!();

    let mut session = ChatSession::start(client, options).await;
    for message in session.transcript() {
        print_message(message);
    }

    let stdin = io::stdin();
    loop {
        print!("you: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "/quit" || text == "/exit" {
            break;
        }

        match session.send(text).await {
            Ok(reply) => println!("aura: {reply}\n"),
            Err(_) => {
                // The raw error stays in the logs; the transcript gets the
                // canned apology and the conversation continues.
                let fallback = session.append_fallback();
                println!("aura: {fallback}\n");
            }
        }
    }

    Ok(())
}

fn print_message(message: &ChatMessage) {
    let tag = match message.role {
        ChatRole::User => "you",
        ChatRole::Model => "aura",
    };
    println!("{tag}: {}\n", message.text);
}
