use serde_json::json;
use tether_proto::RemoteError;
use tether_rpc::{MethodTable, ProxyBuilder, RpcClient, arg, spawn_local};
use tracing::info;

struct Greeter;

fn greeter_table() -> MethodTable<Greeter> {
    MethodTable::new()
        .register("greet", |_greeter, args| async move {
            let name: String = arg(&args, 0)?;
            if name.is_empty() {
                return Err(RemoteError::invalid_argument("name must not be empty"));
            }
            Ok(json!(format!("hello, {name}")))
        })
        .register("add", |_greeter, args| async move {
            let a: i64 = arg(&args, 0)?;
            let b: i64 = arg(&args, 1)?;
            Ok(json!(a + b))
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let channel = spawn_local(Greeter, greeter_table());
    let proxy = ProxyBuilder::new()
        .methods(["greet", "add"])
        .build(RpcClient::new(channel));

    let greet = proxy.method("greet").expect("declared method");
    info!("greet -> {}", greet.invoke(vec![json!("tether")]).await?);

    let add = proxy.method("add").expect("declared method");
    info!("add -> {}", add.invoke(vec![json!(40), json!(2)]).await?);

    if let Err(err) = greet.invoke(vec![json!("")]).await {
        info!("expected failure: {}", err);
    }

    proxy.dispose();
    Ok(())
}
