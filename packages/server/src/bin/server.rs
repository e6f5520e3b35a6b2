//! Room-scoped WebSocket chat relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 127.0.0.1 --port 3000 --dedup-history
//! REDIS_URL=redis://127.0.0.1/ cargo run --bin hiroba-server
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    domain::{ChatHistory, HistoryStore},
    infrastructure::{
        history::{InMemoryHistoryStore, RedisHistoryStore},
        message_pusher::WebSocketMessagePusher,
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, GetHistoryUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, RoomBroadcaster, SendMessageUseCase,
    },
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Room-scoped WebSocket chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Skip storing a message whose content equals the newest stored one
    #[arg(long, env = "HIROBA_DEDUP_HISTORY")]
    dedup_history: bool,

    /// Redis URL for the history store (in-memory when omitted)
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. History store
    // 2. MessagePusher
    // 3. RoomBroadcaster
    // 4. UseCases
    // 5. Server

    // 1. Create history store (Redis when configured, otherwise in-memory)
    let store: Arc<dyn HistoryStore> = match &args.redis_url {
        Some(url) => match RedisHistoryStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, keeping history in memory");
            Arc::new(InMemoryHistoryStore::new())
        }
    };
    let history = Arc::new(ChatHistory::new(store).with_dedup(args.dedup_history));
    tracing::info!(
        "History keeps {} messages per room (dedup: {})",
        history.capacity(),
        args.dedup_history
    );

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create RoomBroadcaster (owns the room registry)
    let broadcaster = Arc::new(RoomBroadcaster::new(message_pusher));

    // 4. Create UseCases
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        broadcaster.clone(),
        history.clone(),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(broadcaster.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        broadcaster.clone(),
        history.clone(),
        Arc::new(SystemClock),
    ));
    let get_history_usecase = Arc::new(GetHistoryUseCase::new(history));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(broadcaster.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(broadcaster));

    // 5. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        disconnect_session_usecase,
        send_message_usecase,
        get_history_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
