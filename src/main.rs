#[tokio::main]
async fn main() -> anyhow::Result<()> {
    friday_voice::run().await
}
