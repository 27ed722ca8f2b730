//! Publish a sample push event to the broker, to check that the push
//! consumer is picking up work.

use std::process::ExitCode;

use clap::Parser;

use push_common::config::AppConfig;
use push_normalizer::EventNormalizer;
use push_publisher::amqp_publisher;
use push_tools::test_event::SampleEvent;

#[derive(Parser, Debug)]
#[command(name = "push-publish")]
#[command(about = "Publish a test push event to RabbitMQ")]
struct Args {
    /// User ID for the notification
    #[arg(long, default_value = "123")]
    user_id: i64,

    /// Event ID (auto-generated if not provided)
    #[arg(long)]
    event_id: Option<String>,

    /// Template code (e.g. "welcome_v1")
    #[arg(long)]
    template: Option<String>,

    /// Message body for the inline payload
    #[arg(long, default_value = "Test notification")]
    message: String,

    /// Message title for the inline payload
    #[arg(long, default_value = "Test Notification")]
    title: String,

    /// Target queue (defaults to PUSH_QUEUE)
    #[arg(long)]
    queue: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    push_tools::init_tracing();
    let args = Args::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let queue = args.queue.unwrap_or_else(|| config.push_queue.clone());

    let sample = SampleEvent {
        user_id: args.user_id,
        event_id: args.event_id,
        template: args.template,
        title: args.title,
        message: args.message,
    };
    let event = match EventNormalizer::new().normalize(&sample.to_wire()) {
        Ok(event) => event,
        Err(e) => {
            eprintln!("Invalid event: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&event) {
        Ok(json) => println!("Publishing test event: {json}"),
        Err(e) => tracing::warn!(error = %e, "Could not render event for display"),
    }

    let publisher = amqp_publisher(&config.rabbitmq_url);
    match publisher.publish(&queue, &event).await {
        Ok(outcome) => {
            println!("Message published to {queue} (queue check: {outcome})");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to publish message: {e}");
            ExitCode::FAILURE
        }
    }
}
