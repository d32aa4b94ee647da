mod builtin;

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use plinth_core::extension_system::{ExtensionInstaller, parse_reference};
use plinth_core::kernel::error::Result;
use plinth_core::storage::LocalStorageProvider;
use plinth_core::{Application, ExtensionKernel, KernelSettings};

/// Plinth: extension discovery and lifecycle kernel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Project root holding the settings file and extension folders
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed and discovered extensions
    #[command(name = "extension:list")]
    List,
    /// Scan the root namespaces and print what was found
    #[command(name = "extension:discover")]
    Discover,
    /// Install an extension
    #[command(name = "extension:install")]
    Install {
        /// `<type>/<name>`, e.g. `module/Banner`
        reference: String,
    },
    /// Uninstall an extension and its plugins
    #[command(name = "extension:uninstall")]
    Uninstall {
        /// `<type>/<name>`
        reference: String,
    },
    /// Delete an uninstalled extension's folder
    #[command(name = "extension:delete")]
    Delete {
        /// `<type>/<name>`
        reference: String,
    },
    /// Forget the discovery cache
    #[command(name = "extension:clear-cache")]
    ClearCache,
    /// Load, register, boot and activate installed extensions
    #[command(name = "extension:boot")]
    Boot,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = CliArgs::parse();
    debug!("Parsed args: {:?}", args);

    match run(args).await {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<String> {
    let root = args.root;
    let settings = KernelSettings::load(&LocalStorageProvider::new(root.clone()), &root)?;
    let mut kernel = ExtensionKernel::from_settings(&settings, &root, builtin::catalog());

    match args.command {
        Commands::List => list(&mut kernel).await,
        Commands::Discover => {
            kernel.discover().await?;
            Ok(render_discovered(&kernel))
        }
        Commands::Install { reference } => {
            let (extension_type, name) = parse_reference(&reference)?;
            let row = ExtensionInstaller::new(&mut kernel).install(&extension_type, &name).await?;
            Ok(format!("Installed {}/{} ({})", row.extension_type, row.name, row.identifier))
        }
        Commands::Uninstall { reference } => {
            let (extension_type, name) = parse_reference(&reference)?;
            let row = ExtensionInstaller::new(&mut kernel).uninstall(&extension_type, &name).await?;
            Ok(format!("Uninstalled {}/{}", row.extension_type, row.name))
        }
        Commands::Delete { reference } => {
            let (extension_type, name) = parse_reference(&reference)?;
            let path = ExtensionInstaller::new(&mut kernel).delete(&extension_type, &name).await?;
            Ok(format!("Deleted {}", path.display()))
        }
        Commands::ClearCache => Ok(if kernel.clear_discover_cache().await? {
            "Discovery cache cleared".to_string()
        } else {
            "Discovery cache was already empty".to_string()
        }),
        Commands::Boot => {
            let mut app = Application::new(root);
            kernel.run(&mut app).await?;
            let extensions = kernel.extensions();
            let mut out = format!("Booted {} extension(s)", extensions.len());
            for (position, extension) in extensions.iter().enumerate() {
                let _ = write!(out, "\n  {}. {}", position + 1, extension.identifier());
            }
            Ok(out)
        }
    }
}

async fn list(kernel: &mut ExtensionKernel) -> Result<String> {
    kernel.discover().await?;
    let installed = kernel.store().all_extensions().await?;

    let mut out = String::new();
    if installed.is_empty() {
        out.push_str("No extensions installed");
    } else {
        out.push_str("Installed:");
        for row in &installed {
            let _ = write!(out, "\n  {}/{} ({})", row.extension_type, row.name, row.identifier);
        }
    }
    out.push('\n');
    out.push_str(&render_discovered(kernel));
    Ok(out)
}

fn render_discovered(kernel: &ExtensionKernel) -> String {
    let registry = kernel.registry();
    if registry.is_empty() {
        return "No extensions discovered".to_string();
    }
    let mut out = String::from("Discovered:");
    for (extension_type, identifiers) in registry.all() {
        for identifier in identifiers {
            let _ = write!(out, "\n  [{}] {}", extension_type, identifier);
        }
    }
    out
}
