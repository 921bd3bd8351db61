use clap::Parser;
use fluent_gwl::app::{handle_fatal_error, init_logging, AppConfig};
use fluent_gwl::cli::{execute_command, Cli, Session};

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = AppConfig::new(verbose).and_then(|app| {
        let logging = init_logging(&app);
        let config = Session::load_config(&app.working_dir, cli.config, cli.catalog)?;
        let app = app.with_log_filter(config.log_level.clone());
        logging.apply(&app)?;
        execute_command(cli.command, config, &app)
    });

    if let Err(error) = result {
        handle_fatal_error(error, verbose);
    }
}
