#[tokio::main]
async fn main() -> std::process::ExitCode {
    game_server::start(std::env::args()).await
}
