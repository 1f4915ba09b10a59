//! A runnable demo wiring a couple of containers onto the Exposer gRPC
//! surface — the analogue of the teacher's `examples/example-grpc`.
//!
//! Run with `cargo run -p exposer-demo`, then issue calls with any gRPC
//! client against `localhost:50051`, e.g. `grpcurl` against the `Exposer`
//! service (§4.4):
//!
//! ```text
//! grpcurl -plaintext -d '{"containerName":"Greeter","memberName":"hi"}' \
//!     localhost:50051 exposer.v1.Exposer/InvokeCallable
//! ```

use std::sync::Arc;

use exposer::prelude::*;

/// A public, unsecured container (§8 S1 "Public call").
pub struct Greeter;

#[expose_impl]
impl Greeter {
    #[expose(description = "returns a friendly greeting")]
    fn hi(&self) -> String {
        "hello".to_string()
    }

    #[expose(description = "greets a named caller")]
    fn greet(&self, name: String) -> String {
        format!("hello, {name}")
    }
}

/// Overloaded CALLABLEs narrowed by argument shape (§8 S2).
pub struct Calculator;

#[expose_impl]
impl Calculator {
    #[expose(description = "squares an integer")]
    fn square(&self, x: i64) -> i64 {
        x * x
    }

    #[expose(description = "repeats a string twice")]
    fn square_str(&self, x: String) -> String {
        format!("{x}{x}")
    }
}

/// A container with one immutable DATUM (§8 S3 "Immutable write").
#[derive(Exposed)]
pub struct Build {
    #[expose(immutable, description = "semantic version of this build")]
    version: ExposedCell<String>,
}

/// A container whose CALLABLE requires a shared key (§8 S4 "Token-family gate").
pub struct Vault;

#[expose_impl]
impl Vault {
    #[expose(secured = "key_only", description = "reads a protected value")]
    fn read_secret(&self) -> String {
        "super-secret".to_string()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let registry = Arc::new(Registry::new());

    let greeter = Arc::new(Greeter);
    registry.register_container(ContainerDescriptor {
        container_name: Greeter::__EXPOSE_CONTAINER_NAME,
        members: Greeter::__expose_callable_members(greeter),
        aliases: Greeter::__expose_callable_aliases(),
    });

    let calculator = Arc::new(Calculator);
    registry.register_container(ContainerDescriptor {
        container_name: Calculator::__EXPOSE_CONTAINER_NAME,
        members: Calculator::__expose_callable_members(calculator),
        aliases: Calculator::__expose_callable_aliases(),
    });

    let build = Arc::new(Build {
        version: ExposedCell::new("1.0.0".to_string()),
    });
    registry.register_container(ContainerDescriptor {
        container_name: Build::__EXPOSE_DATUM_CONTAINER_NAME,
        members: Build::__expose_datum_members(build),
        aliases: Vec::new(),
    });

    let vault = Arc::new(Vault);
    registry.register_container(ContainerDescriptor {
        container_name: Vault::__EXPOSE_CONTAINER_NAME,
        members: Vault::__expose_callable_members(vault),
        aliases: Vault::__expose_callable_aliases(),
    });

    registry.freeze();

    let mut config = ExposerConfig::default();
    config.security.enabled = true;
    config.security.key.enabled = true;
    config.security.key.keys = vec!["demo-key".to_string()];

    let authenticator = Arc::new(Authenticator::new(config.security).await?);
    let service = ExposerService::new(registry, authenticator);

    tracing::info!("Exposer demo listening on :{}", config.transport.port);
    serve(config.transport, service).await?;

    Ok(())
}
