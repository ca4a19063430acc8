use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "product-lister",
    version,
    about = "admin product listing client",
    long_about = "Product-lister fetches one page of the admin product listing from the catalog search API and prints it.\n\nExamples:\n  product-lister -u http://shop.local -s milk\n  product-lister -u http://shop.local -F brand=X -F category=dairy -p 2 -l 50\n  product-lister --config ~/.product-lister/config.yml --sort base_price --direction desc"
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text or json."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        help_heading = "Backend",
        help = "Backend base URL."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Backend",
        help = "Path to config file (defaults to ~/.product-lister/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Backend",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Backend",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "proxy",
        value_name = "URL",
        help_heading = "Backend",
        help = "HTTP proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "no-availability",
        help_heading = "Backend",
        help = "Do not load availability for the listed products."
    )]
    pub no_availability: bool,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TEXT",
        help_heading = "Listing",
        help = "Search text (sent as q)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'F',
        long = "filter",
        value_name = "KEY=VALUE",
        action = ArgAction::Append,
        help_heading = "Listing",
        help = "Extra filter passed through to the search API (repeatable)."
    )]
    pub filter: Vec<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Listing",
        help = "Page number, starting at 1."
    )]
    pub page: Option<u32>,

    #[arg(
        short = 'l',
        long = "limit",
        value_name = "N",
        help_heading = "Listing",
        help = "Products per page."
    )]
    pub limit: Option<u32>,

    #[arg(
        long = "sort",
        value_name = "COLUMN",
        help_heading = "Listing",
        help = "Sort column (name, base_price, ...)."
    )]
    pub sort: Option<String>,

    #[arg(
        long = "direction",
        value_name = "DIR",
        help_heading = "Listing",
        help = "Sort direction: asc or desc."
    )]
    pub direction: Option<String>,

    #[arg(
        long = "sort-mode",
        value_name = "MODE",
        help_heading = "Listing",
        help = "Send the sort column as-is (column) or mapped to the API vocabulary (api)."
    )]
    pub sort_mode: Option<String>,

    #[arg(
        short = 'c',
        long = "city",
        value_name = "ID",
        help_heading = "Listing",
        help = "City id (defaults to 1)."
    )]
    pub city: Option<String>,
}
