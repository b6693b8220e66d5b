use clap::{Parser, Subcommand};

const DESCRIPTION: &str = r#"
The EasyPost Client

A command line interface for fetching, creating and updating EasyPost objects.
Objects are addressed by ID (e.g. prcl_123); the object type is read from the ID prefix.
"#;

#[derive(Parser)]
#[clap(name = "easypost", version = clap::crate_version!(), about = DESCRIPTION)]
pub struct Opts {
    #[clap(
        short = 'k',
        long = "api-key",
        env = "EASYPOST_API_KEY",
        hide_env_values = true,
        help = "The API key used to authenticate with the API"
    )]
    pub api_key: String,
    #[clap(
        short = 's',
        long = "api-base",
        env = "EASYPOST_API_BASE",
        default_value = easypost::client::DEFAULT_BASE_URL,
        help = "The base URL of the API, including the version segment"
    )]
    pub api_base: String,
    #[clap(
        long = "max-retries",
        default_value = "0",
        help = "How many times to retry requests that fail with a transient error"
    )]
    pub max_retries: u32,

    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand)]
pub enum SubCommand {
    #[clap(name = "get", about = "Fetch an object by ID and print it")]
    Get(Get),
    #[clap(name = "create", about = "Create a new object")]
    Create(Create),
    #[clap(name = "update", about = "Update fields on an existing object")]
    Update(Update),
    #[clap(name = "list", about = "List objects of a type")]
    List(List),
}

#[derive(Parser)]
pub struct Get {
    #[clap(index = 1, value_name = "ID", help = "The ID of the object to fetch")]
    pub id: String,
}

#[derive(Parser)]
pub struct Create {
    #[clap(
        index = 1,
        value_name = "TYPE",
        help = "The type of object to create (e.g. parcel)"
    )]
    pub kind: String,
    #[clap(
        index = 2,
        value_name = "FIELD=VALUE",
        help = "Fields to set. Values are parsed as JSON, falling back to a plain string"
    )]
    pub fields: Vec<String>,
}

#[derive(Parser)]
pub struct Update {
    #[clap(index = 1, value_name = "ID", help = "The ID of the object to update")]
    pub id: String,
    #[clap(
        index = 2,
        value_name = "FIELD=VALUE",
        help = "Fields to set. Values are parsed as JSON, falling back to a plain string"
    )]
    pub fields: Vec<String>,
}

#[derive(Parser)]
pub struct List {
    #[clap(
        index = 1,
        value_name = "TYPE",
        help = "The type of object to list (e.g. addresses)"
    )]
    pub kind: String,
    #[clap(long = "page-size", help = "The number of objects to return")]
    pub page_size: Option<u32>,
    #[clap(long = "before-id", help = "Only list objects created before this ID")]
    pub before_id: Option<String>,
    #[clap(long = "after-id", help = "Only list objects created after this ID")]
    pub after_id: Option<String>,
}
