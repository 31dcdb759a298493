use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use vkbot_core::{init_tracing, Adapter, ChannelBus};
use vkbot_vk::{VkAdapter, VkConfig, VkEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_file = "logs/vk-echo-bot.log";
    std::fs::create_dir_all("logs").context("Failed to create logs directory")?;
    init_tracing(Some(log_file)).context("Failed to initialize logging")?;

    let config = VkConfig::from_env()?;
    info!(config = ?config, log_file = %log_file, "Echo Bot starting");

    let adapter = Arc::new(VkAdapter::new(config).await?);
    let (bus, mut events) = ChannelBus::<VkEvent>::new();
    adapter.register_at(Arc::new(bus));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                handle_event(&adapter, event).await;
            }
        }
    }

    adapter.close().await?;
    info!("Echo Bot stopped");
    Ok(())
}

async fn handle_event(adapter: &VkAdapter, event: VkEvent) {
    let reply = match &event {
        VkEvent::MessageReceived(msg) if !msg.text.is_empty() => {
            info!(author_id = %msg.author_id, channel = %msg.channel, message_content = %msg.text, "Echoing message");
            format!("Echo: {}", msg.text)
        }
        VkEvent::UserEnteredChat(e) => format!("Welcome, id{}!", e.user_id),
        VkEvent::ChatTitleUpdate(e) => format!("New title: {}", e.new_text),
        other => {
            info!(channel = %other.channel(), "Ignoring event");
            return;
        }
    };

    match adapter.send(&reply, event.channel()).await {
        Ok(()) => info!(channel = %event.channel(), "Sent echo response"),
        Err(e) => error!(channel = %event.channel(), error = %e, "Failed to send echo"),
    }
}
