use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use fs_err as fs;

use wingman::cli;
use wingman::config::Config;
use wingman::gateway;
use wingman::profile::ProfileStore;
use wingman::turn::TurnHandler;
use wingman::ux;
use wingman::wire::{ChatTurn, ImageContext, ImageUpload, StyleParams, SuggestTurn, ImageTurn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let mut cfg = Config::default();
    cfg.data_dir = args.data_dir.clone();
    cfg.timeout_secs = args.timeout_secs;
    cfg.save_request = args.save_request;
    cfg.save_response = args.save_response;
    if let Some(model) = &args.model {
        cfg.model = model.clone();
    }

    let store = Arc::new(ProfileStore::open(Path::new(&cfg.data_dir).join("profiles.json")));
    let gateway = gateway::make_gateway(&cfg);
    let handler = TurnHandler::new(store.clone(), gateway, cfg.clone(), args.debug);

    let style = StyleParams {
        response_style: args.style.clone(),
        msg_length: args.length,
        emoji_usage: args.emoji,
        flirtiness: args.flirt,
        user_samples: String::new(),
    };

    ux::print_banner(&cfg.model, &args.user);

    // A fresh profile gets the greeting turn before any input is read.
    if store.get(&args.user).conversation_step == 0 && store.chat_history(&args.user).is_empty() {
        let turn = chat_turn(&args.user, String::new(), None, &style, args.trial);
        match handler.handle_message(&turn).await {
            Ok(r) => ux::print_reply(&r.reply),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    while let Some(line) = ux::read_line("> ")? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        if line == "/reset" {
            store.reset(&args.user);
            if let Err(e) = store.persist() {
                eprintln!("warning: failed to persist profiles: {e}");
            }
            println!("profile reset\n");
            continue;
        }
        if let Some(rest) = line.strip_prefix("/image ") {
            let (upload, context) = match load_image(rest) {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    continue;
                }
            };
            let mut turn = chat_turn(&args.user, String::new(), Some(upload), &style, args.trial);
            turn.context = context;
            match handler.handle_message(&turn).await {
                Ok(r) => ux::print_reply(&r.reply),
                Err(e) => eprintln!("error: {e}"),
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("/replies ") {
            let (upload, context) = match load_image(rest) {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    continue;
                }
            };
            let turn = ImageTurn {
                user_id: args.user.clone(),
                image: Some(upload),
                context,
                from_keyboard: true,
                is_trial: args.trial,
            };
            match handler.handle_image(&turn).await {
                Ok(set) => ux::print_suggestions(&set.suggestions),
                Err(e) => eprintln!("error: {e}"),
            }
            continue;
        }
        if let Some(context) = line.strip_prefix("/suggest ") {
            let turn = SuggestTurn {
                user_id: args.user.clone(),
                context: context.to_string(),
                conversation_type: "dating".into(),
            };
            match handler.handle_suggest(&turn).await {
                Ok(set) => ux::print_suggestions(&set.suggestions),
                Err(e) => eprintln!("error: {e}"),
            }
            continue;
        }

        let turn = chat_turn(&args.user, line, None, &style, args.trial);
        match handler.handle_message(&turn).await {
            Ok(r) => ux::print_reply(&r.reply),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}

fn chat_turn(
    user: &str,
    message: String,
    image: Option<ImageUpload>,
    style: &StyleParams,
    is_trial: bool,
) -> ChatTurn {
    ChatTurn {
        user_id: user.to_string(),
        message,
        image,
        style: style.clone(),
        context: ImageContext::default(),
        is_trial,
    }
}

/// Parses `<path> [who] [help]` and reads the screenshot bytes.
fn load_image(rest: &str) -> anyhow::Result<(ImageUpload, ImageContext)> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let path = parts.next().unwrap_or_default();
    let who = parts.next().unwrap_or_default().to_string();
    let help = parts.next().unwrap_or_default().trim().to_string();

    let bytes = fs::read(path)?;
    let upload = ImageUpload { file_name: path.to_string(), bytes };
    Ok((upload, ImageContext { who, help }))
}
