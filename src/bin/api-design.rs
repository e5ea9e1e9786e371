//! API Design CLI
//!
//! Builds the bundled cellar sample design and prints it, or prints every
//! error collected while building it.

use std::process::ExitCode;

use api_design::{
    AttributeDefinition, BuildContext, DataType, Design, DesignError, MediaTypeDefinition, Object,
    PayloadSource, RouteDefinition, UserTypeDefinition,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const ACCOUNT_MEDIA: &str = "application/vnd.account+json";
const BOTTLE_MEDIA: &str = "application/vnd.bottle+json";

#[derive(Parser)]
#[command(name = "api-design")]
#[command(about = "Build and inspect the sample cellar API design")]
#[command(version)]
struct Cli {
    /// Base path prepended to every top-level resource
    #[arg(long, global = true, default_value = "/cellar")]
    base_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the design as JSON
    Show {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Only print the resource with this name
        #[arg(long)]
        resource: Option<String>,
    },

    /// Print the route table
    Routes,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let design = match build_cellar(&cli.base_path) {
        Ok(design) => design,
        Err(e) => {
            for err in e.errors() {
                eprintln!("error: {}", err);
            }
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let result = match cli.command {
        Commands::Show { pretty, resource } => run_show(&design, pretty, resource.as_deref()),
        Commands::Routes => {
            run_routes(&design);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_show(design: &Design, pretty: bool, resource: Option<&str>) -> Result<(), u8> {
    let output = match resource {
        Some(name) => {
            let Some(resource) = design.resource(name) else {
                eprintln!("Error: unknown resource {}", name);
                return Err(2);
            };
            to_json(resource, pretty)
        }
        None => to_json(design, pretty),
    }
    .map_err(|e| {
        eprintln!("Error serializing design: {}", e);
        2u8
    })?;

    println!("{}", output);
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn run_routes(design: &Design) {
    for resource in design.resources.values() {
        for action in resource.actions.values() {
            for route in &action.routes {
                println!(
                    "{:<7} {:<48} {}#{}",
                    route.verb,
                    design.route_full_path(resource, route),
                    resource.name,
                    action.name
                );
            }
        }
    }
}

fn object(fields: &[(&str, DataType)]) -> AttributeDefinition {
    let fields: Object = fields
        .iter()
        .map(|(name, ty)| (name.to_string(), AttributeDefinition::new(ty.clone())))
        .collect();
    AttributeDefinition::new(DataType::Object(fields))
}

fn build_cellar(base_path: &str) -> Result<Design, DesignError> {
    let mut account = object(&[
        ("id", DataType::Integer),
        ("name", DataType::String),
        ("created_at", DataType::DateTime),
    ]);
    account.description = Some("A tenant account".into());

    let bottle = object(&[
        ("id", DataType::Integer),
        ("name", DataType::String),
        ("vintage", DataType::Integer),
        ("rating", DataType::Integer),
    ]);

    let mut bottle_payload = object(&[
        ("name", DataType::String),
        ("vintage", DataType::Integer),
    ]);
    bottle_payload.validations.required = vec!["name".into(), "vintage".into()];

    let design = Design::new("cellar")
        .with_base_path(base_path)
        .with_media_type(MediaTypeDefinition::new(ACCOUNT_MEDIA, account))
        .with_media_type(MediaTypeDefinition::new(BOTTLE_MEDIA, bottle))
        .with_type(UserTypeDefinition::new("BottlePayload", bottle_payload));

    let mut ctx = BuildContext::new(design);

    let _ = ctx.resource("account", |ctx| {
        ctx.default_media(ACCOUNT_MEDIA)?;
        ctx.base_path("/accounts")?;
        ctx.response("NotFound", |ctx| ctx.status(404))?;

        ctx.action("show", |ctx| {
            ctx.description("Retrieve account with given id")?;
            ctx.routing([RouteDefinition::get("/:accountID")])?;
            ctx.params(|ctx| ctx.param("accountID", DataType::Integer))
        })?;

        ctx.action("create", |ctx| {
            ctx.description("Create new account")?;
            ctx.routing([RouteDefinition::post("")])?;
            ctx.payload(PayloadSource::dsl(|ctx| {
                ctx.inherit("name")?;
                ctx.required(["name"])
            }))?;
            ctx.response("Created", |ctx| {
                ctx.status(201)?;
                ctx.headers(|ctx| {
                    ctx.attribute_with("Location", DataType::String, |ctx| {
                        ctx.pattern("/accounts/[0-9]+")
                    })
                })
            })
        })?;

        ctx.action("update", |ctx| {
            ctx.description("Change account name")?;
            ctx.routing([RouteDefinition::put("/:accountID")])?;
            ctx.params(|ctx| ctx.param("accountID", DataType::Integer))?;
            ctx.payload(PayloadSource::dsl(|ctx| {
                ctx.inherit("name")?;
                ctx.required(["name"])
            }))
        })?;

        ctx.action("delete", |ctx| {
            ctx.routing([RouteDefinition::delete("/:accountID")])?;
            ctx.params(|ctx| ctx.param("accountID", DataType::Integer))
        })
    });

    let _ = ctx.resource("bottle", |ctx| {
        ctx.default_media(BOTTLE_MEDIA)?;
        ctx.base_path("bottles")?;
        ctx.parent("account")?;
        ctx.headers(|ctx| ctx.header("X-Request-Id", DataType::String))?;

        ctx.action("list", |ctx| {
            ctx.routing([
                RouteDefinition::get(""),
                RouteDefinition::get("//vintages/:year/bottles"),
            ])?;
            ctx.params(|ctx| {
                ctx.param("year", DataType::Integer)?;
                ctx.attribute_with("sort", DataType::String, |ctx| {
                    ctx.enum_values(["name", "vintage", "rating"])
                })
            })
        })?;

        ctx.action("show", |ctx| {
            ctx.routing([RouteDefinition::get("/:bottleID")])?;
            ctx.params(|ctx| ctx.param("bottleID", DataType::Integer))
        })?;

        ctx.action("create", |ctx| {
            ctx.routing([RouteDefinition::post("")])?;
            ctx.payload("BottlePayload")
        })?;

        ctx.action("rate", |ctx| {
            ctx.routing([RouteDefinition::put("/:bottleID/actions/rate")])?;
            ctx.payload_with(PayloadSource::named("BottlePayload"), |ctx| {
                ctx.attribute_with("rating", DataType::Integer, |ctx| {
                    ctx.minimum(1.0)?;
                    ctx.maximum(5.0)
                })?;
                ctx.required(["rating"])
            })
        })
    });

    ctx.finish()
}
