//! tubelink CLI binary entry point.

use tubelink::cli::{AuthCommands, Cli, Commands, Context};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    tubelink::cli::init_logging(cli.verbose);

    let ctx = match Context::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login => tubelink::cli::auth::handle_login(&ctx).await,
            AuthCommands::Status => tubelink::cli::auth::handle_status(&ctx).await,
            AuthCommands::Logout => tubelink::cli::auth::handle_logout(&ctx).await,
            AuthCommands::Refresh => tubelink::cli::auth::handle_refresh(&ctx).await,
        },
        Commands::Feed(feed_args) => tubelink::cli::feed::handle_feed(&ctx, feed_args).await,
    };

    if let Err(e) = result {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
