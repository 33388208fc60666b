//! Config subcommand handlers. None of these contact the controller.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&util::config_file(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let config = util::load_file_config(global)?.redacted();
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => config.to_toml()?,
                _ => output::render_single(&global.output, &config, |_| String::new(), |_| String::new()),
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Validate => {
            let config = util::load_platform_config(global)?;
            let msg = format!(
                "Configuration OK: {} at {} (site {}), {} rule(s), {} policy(ies)",
                config.name,
                config.session.url,
                config.site,
                config.rules.len(),
                config.policies.len()
            );
            output::print_output(&msg, global.quiet);
            Ok(())
        }
    }
}
