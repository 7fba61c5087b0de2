use example_nanorpc_app::register_calculator;
use example_nanorpc_app::service_definition::{Add, CALCULATOR_SERVICE, Fail, Mult};
use nanorpc::queue::{MemoryQueue, QueueTransport};
use nanorpc_rpc_client::{RpcClient, RpcServiceCallerInterface};
use nanorpc_tokio_rpc_server::{DispatchMode, RpcServer};
use tokio::join;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("example_nanorpc_app=info".parse()?),
        )
        .init();

    // Both sides share one in-process store, each on its own connection.
    let queue = MemoryQueue::new();

    let server = RpcServer::new(CALCULATOR_SERVICE, queue.duplicate());
    server.connect().await?;
    register_calculator(&server)?;
    let handle = server.run(DispatchMode::Concurrent).await?;

    let client = RpcClient::new(queue.duplicate());
    client.connect().await?;

    // `join!` will await all responses before proceeding
    let (res1, res2, res3) = join!(
        client.call::<_, f64>(CALCULATOR_SERVICE, Add::METHOD, [1.0, 2.0, 3.0]),
        client.call::<_, f64>(CALCULATOR_SERVICE, Add::METHOD, [8.0, 3.0, 7.0]),
        client.call::<_, f64>(CALCULATOR_SERVICE, Mult::METHOD, [8.0, 3.0, 7.0]),
    );

    tracing::info!("Result from first add(): {:?}", res1);
    tracing::info!("Result from second add(): {:?}", res2);
    tracing::info!("Result from first mult(): {:?}", res3);

    let add = client.invoke(CALCULATOR_SERVICE, Add::METHOD);
    for n in 1..=3 {
        let total: f64 = add.call([n as f64; 3]).await?;
        tracing::info!("add({n}, {n}, {n}) = {total}");
    }

    if let Err(err) = client
        .call::<_, f64>(CALCULATOR_SERVICE, Fail::METHOD, ["as expected"])
        .await
    {
        tracing::info!("fail() raised code {}: {}", err.code, err.message);
    }

    handle.stop().await?;
    client.close().await?;

    Ok(())
}
