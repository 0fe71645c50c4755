//! Fleetdesk CLI - Main entry point for CLI binary
//!
//! This binary provides the `fleetdesk` tool for inspecting role permissions.
//! Session edits given with --grant/--revoke/--reset are applied in memory
//! and discarded on exit.

use fleetdesk_lib::engine::{
    cli::{formatter::CliFormatter, Cli, Commands, OutputFormat},
    config::Config,
    rbac::{Action, Module, PermissionResolver, Role, RoleTable},
    users::{effective_chips, UserDirectory, UserFilter},
};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        CliFormatter::error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env("FLEETDESK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_cli(cli: Cli) -> CliResult {
    let project_dir = cli.get_project_dir();
    let config = Config::load(&project_dir)?;
    init_logging(&config);
    let config_path = Config::path(&project_dir);
    tracing::debug!(
        path = %config_path.display(),
        found = config_path.exists(),
        "config loaded"
    );

    let json_output = cli.format == OutputFormat::Json;
    let resolver = build_resolver(&cli)?;

    match cli.command {
        Commands::Roles => cmd_roles(&resolver, json_output)?,
        Commands::Matrix { role } => {
            let role = role_or(role.as_deref(), config.selected_role)?;
            cmd_matrix(&resolver, role, json_output)?;
        }
        Commands::Check { role, module, action } => {
            cmd_check(&resolver, &role, &module, &action, json_output)?;
        }
        Commands::Effective { role } => {
            let role = role_or(role.as_deref(), config.default_role)?;
            cmd_effective(&resolver, role, json_output)?;
        }
        Commands::Users { file, query, role, active } => {
            let filter = UserFilter {
                query,
                role: role.as_deref().map(str::parse::<Role>).transpose()?,
                only_active: active,
            };
            cmd_users(&resolver, &config, &file, &filter, json_output)?;
        }
    }

    Ok(())
}

fn build_resolver(cli: &Cli) -> Result<PermissionResolver, Box<dyn std::error::Error>> {
    let mut resolver = match &cli.table {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            PermissionResolver::with_table(RoleTable::from_json(&content)?)
        }
        None => PermissionResolver::new(),
    };

    for edit in &cli.grant {
        resolver.apply_edit(edit, true)?;
    }
    for edit in &cli.revoke {
        resolver.apply_edit(edit, false)?;
    }
    for name in &cli.reset {
        resolver.reset_role(name.parse()?);
    }

    Ok(resolver)
}

fn role_or(name: Option<&str>, fallback: Role) -> Result<Role, Box<dyn std::error::Error>> {
    Ok(match name {
        Some(name) => name.parse()?,
        None => fallback,
    })
}

fn cmd_roles(resolver: &PermissionResolver, json: bool) -> CliResult {
    if json {
        let roles: Vec<_> = Role::ALL
            .iter()
            .map(|r| {
                serde_json::json!({
                    "role": r,
                    "description": r.description(),
                    "modified": resolver.is_modified(*r),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&roles)?);
        return Ok(());
    }

    CliFormatter::header("Roles");
    CliFormatter::table_header(&[("Role", 6), ("Description", 52), ("Status", 8)]);
    for role in Role::ALL {
        let status = if resolver.is_modified(role) { "modified" } else { "default" };
        CliFormatter::table_row(&[(role.as_str(), 6), (role.description(), 52), (status, 8)]);
    }
    Ok(())
}

fn cmd_matrix(resolver: &PermissionResolver, role: Role, json: bool) -> CliResult {
    let matrix = resolver.table().matrix(role);
    if json {
        println!("{}", serde_json::to_string_pretty(matrix)?);
        return Ok(());
    }

    CliFormatter::header(&format!("Permissions: {} ({})", role, role.description()));
    let mut columns = vec![("Module", 11)];
    columns.extend(Action::ALL.iter().map(|a| (a.as_str(), 7)));
    CliFormatter::table_header(&columns);

    for module in Module::ALL {
        let cells: Vec<(bool, usize)> = Action::ALL.iter().map(|a| (matrix.get(module, *a), 7)).collect();
        CliFormatter::grant_row(module.as_str(), 11, &cells);
    }
    if resolver.is_modified(role) {
        CliFormatter::blank();
        CliFormatter::warning("This role differs from its built-in permissions");
    }
    Ok(())
}

fn cmd_check(resolver: &PermissionResolver, role: &str, module: &str, action: &str, json: bool) -> CliResult {
    let check = resolver.check(role, module, action)?;
    if json {
        println!("{}", serde_json::to_string(&check)?);
    } else if check.allowed {
        CliFormatter::success(&check.to_string());
    } else {
        CliFormatter::warning(&check.to_string());
    }
    Ok(())
}

fn cmd_effective(resolver: &PermissionResolver, role: Role, json: bool) -> CliResult {
    let grants = resolver.effective_permissions(role);
    if json {
        println!("{}", serde_json::to_string_pretty(&grants)?);
        return Ok(());
    }

    CliFormatter::header(&format!("Effective permissions: {}", role));
    if grants.is_empty() {
        CliFormatter::warning("No permissions granted");
    }
    for grant in &grants {
        CliFormatter::item(&grant.to_string());
    }
    Ok(())
}

fn cmd_users(
    resolver: &PermissionResolver,
    config: &Config,
    file: &Path,
    filter: &UserFilter,
    json: bool,
) -> CliResult {
    let mut directory = UserDirectory::new(config.user_id_seed);
    directory.load_json(&std::fs::read_to_string(file)?)?;
    let users = directory.filter(filter);

    if json {
        let rows: Vec<_> = users
            .iter()
            .map(|u| {
                serde_json::json!({
                    "user": u,
                    "effective": effective_chips(resolver.table(), u.role),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    CliFormatter::header(&format!("Users ({} of {})", users.len(), directory.users().len()));
    for user in users {
        let state = if user.active { "active" } else { "inactive" };
        CliFormatter::kv(&user.id, &format!("{} <{}> [{}, {}]", user.name, user.email, user.role, state));
        for chip in effective_chips(resolver.table(), user.role) {
            CliFormatter::item(&chip);
        }
    }
    Ok(())
}
