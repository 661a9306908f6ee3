//! peup-chat - interactive PEUP project search
//!
//! Every stdin line is a query; results and replies are printed as the
//! conversation runtime reports them.

use peup_chat::cache::ResponseCache;
use peup_chat::config::ClientConfig;
use peup_chat::conversation::{
    ConvContext, ConversationRuntime, ConversationUpdate, Message, MessageKind,
};
use peup_chat::protocol::ProjectSearchResult;
use peup_chat::transport::{HttpTransport, LoggingTransport, SearchTransport};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// What the terminal has seen so far
#[derive(Default)]
struct View {
    transcript: Vec<Message>,
    results: Vec<ProjectSearchResult>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the chat on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peup_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        backend = %config.backend_url,
        scope = %config.scope,
        auth = config.auth.mode(),
        cache = config.cache_enabled,
        "Starting peup-chat"
    );

    let http = HttpTransport::new(&config.backend_url, config.timeout)?;
    let transport: Arc<dyn SearchTransport> = Arc::new(LoggingTransport::new(Arc::new(http)));
    let cache = config.cache_enabled.then(ResponseCache::new);
    let context = ConvContext::new(uuid::Uuid::new_v4().to_string(), config.template());

    let handle = ConversationRuntime::new(context, transport, cache).spawn();

    let view = Arc::new(Mutex::new(View::default()));
    let mut updates = handle.subscribe();
    let printer_view = view.clone();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => print_update(&printer_view, update),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Printer fell behind conversation updates");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("Ask for projects (:results, :history, :inspect, :quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            ":quit" | ":q" => break,
            ":results" => with_view(&view, |v| print_results(&v.results)),
            ":history" => with_view(&view, |v| {
                for message in &v.transcript {
                    println!("{} {}", label(message.kind), message.text);
                }
            }),
            ":inspect" => with_view(&view, |v| {
                let last = v.transcript.iter().rev().find_map(|m| m.response.as_ref());
                match last.map(serde_json::to_string_pretty) {
                    Some(Ok(json)) => println!("{json}"),
                    Some(Err(e)) => eprintln!("cannot render response: {e}"),
                    None => println!("(no response yet)"),
                }
            }),
            query => handle.submit(query).await?,
        }
    }

    Ok(())
}

fn with_view(view: &Mutex<View>, f: impl FnOnce(&View)) {
    match view.lock() {
        Ok(guard) => f(&guard),
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}

fn print_update(view: &Mutex<View>, update: ConversationUpdate) {
    let Ok(mut view) = view.lock() else {
        return;
    };
    match update {
        ConversationUpdate::Message(message) => {
            println!("{} {}", label(message.kind), message.text);
            view.transcript.push(message);
        }
        ConversationUpdate::Results(results) => {
            print_results(&results);
            view.results = results;
        }
        ConversationUpdate::State { dispatching: true } => println!("... searching"),
        ConversationUpdate::State { dispatching: false } => {}
        ConversationUpdate::Rejected { reason } => println!("! {reason}"),
    }
}

fn print_results(results: &[ProjectSearchResult]) {
    if results.is_empty() {
        println!("  (no results)");
    }
    for (rank, hit) in results.iter().enumerate() {
        println!(
            "  {:>2}. {} [{:.2}] {}",
            rank + 1,
            hit.project.name,
            hit.relevance_score,
            hit.highlighted_snippet
                .as_deref()
                .unwrap_or(&hit.project.description)
        );
    }
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::User => "you>",
        MessageKind::Bot => "bot>",
    }
}
