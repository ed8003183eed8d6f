#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gw_lib::run().await
}
