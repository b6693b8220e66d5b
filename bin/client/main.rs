use easypost::client::Client;
use easypost::resource::{ApiObject, ListOptions, ResourceKind};
use easypost::{Object, ObjectId};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod opts;

use opts::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = opts::Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let client = Client::builder()
        .api_key(opts.api_key)
        .base_url(opts.api_base)
        .max_retries(opts.max_retries)
        .build()?;

    match opts.subcmd {
        SubCommand::Get(get_opts) => {
            let obj = ApiObject::retrieve(&client, get_opts.id.as_str()).await?;
            print_json(&obj)?;
        }
        SubCommand::Create(create_opts) => {
            let kind: ResourceKind = create_opts.kind.parse()?;
            let params = parse_fields(&create_opts.fields)?;
            let obj = kind.create(&client, params).await?;
            info!(kind = %kind, id = ?obj.object().id, "Created object");
            print_json(&obj)?;
        }
        SubCommand::Update(update_opts) => {
            let id: ObjectId = update_opts.id.parse()?;
            let kind = ResourceKind::from_id(&id)
                .with_context(|| format!("ID {} does not belong to a known type", id))?;
            let params = parse_fields(&update_opts.fields)?;
            let obj = kind.update(&client, &id, params).await?;
            print_json(&obj)?;
        }
        SubCommand::List(list_opts) => {
            let kind: ResourceKind = list_opts.kind.parse()?;
            let page = kind
                .list(
                    &client,
                    ListOptions {
                        page_size: list_opts.page_size,
                        before_id: list_opts.before_id,
                        after_id: list_opts.after_id,
                        ..Default::default()
                    },
                )
                .await?;
            print_json(&page.items)?;
            if page.has_more {
                eprintln!("More results are available, use --after-id to fetch the next page");
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parses `field=value` pairs into an object. Values that are valid JSON keep their type, anything
/// else is sent as a string
fn parse_fields(fields: &[String]) -> anyhow::Result<Object> {
    fields.iter().try_fold(Object::new(), |obj, raw| {
        let (key, value) = raw
            .split_once('=')
            .with_context(|| format!("Field {:?} is not in the form FIELD=VALUE", raw))?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_owned()));
        Ok(obj.with(key, value))
    })
}
