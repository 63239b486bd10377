use argh::FromArgs;

#[derive(FromArgs)]
#[argh(description = "Interactive FTP client. Type HELP once started to get the available commands")]
pub struct Args {
    #[argh(switch, short = 'D', description = "enable TRACE log level")]
    pub debug: bool,
    #[argh(switch, short = 'v', description = "verbose mode")]
    pub verbose: bool,
    #[argh(switch, short = 'V', description = "print version")]
    pub version: bool,
    #[argh(
        option,
        short = 'p',
        description = "port to connect to, overriding the one in the address"
    )]
    pub port: Option<u16>,
    #[argh(positional, description = "address to connect to: [ftp://|ftps://]host[:port]")]
    pub host: Option<String>,
}
