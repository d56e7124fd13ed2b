#[tokio::main]
async fn main() -> std::process::ExitCode {
    deployer::start(std::env::args(), deployer::Procedure::Token).await
}
