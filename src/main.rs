use clap::Parser;
use dotenv::dotenv;

mod cmd;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    owl_standings::logging::init();

    cmd::Cmd::parse().run().await
}
