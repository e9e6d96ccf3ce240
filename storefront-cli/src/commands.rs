use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use storefront::{
    Category, ProductDraft, ProductUpdate, Role, Secret, SessionPhase,
    StorefrontClient, redirect_path,
};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Product catalog client")]
pub struct Cli {
    /// File holding the session token
    #[arg(long, global = true, env = "STOREFRONT_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in, prompting for the password and any verification code
    Login {
        username: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    /// Show who is logged in
    Whoami,
    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(long, value_parser = parse_role, default_value = "NORMAL_USER")]
        role: Role,
    },
    ForgotUsername {
        email: String,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
    },
    #[command(subcommand)]
    Products(ProductCommand),
    /// Show where a path would lead for the current session
    Navigate {
        path: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    Show {
        name: String,
    },
    Create(ProductArgs),
    Update {
        original_name: String,
        #[command(flatten)]
        product: ProductArgs,
    },
    Delete {
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: f64,
    #[arg(long, default_value_t = 0)]
    pub quantity: i64,
    #[arg(long, value_parser = parse_category)]
    pub category: Category,
}

impl From<ProductArgs> for ProductDraft {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            quantity: args.quantity,
            category: Some(args.category),
        }
    }
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::from_claim(raw).ok_or_else(|| format!("unknown role {raw}"))
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::from_wire_name(raw).ok_or_else(|| {
        let known = Category::ALL
            .iter()
            .map(|c| c.wire_name())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown category {raw}, expected one of: {known}")
    })
}

pub fn default_token_path() -> PathBuf {
    PathBuf::from(".storefront").join("session.token")
}

async fn prompt(label: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await??;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

impl Command {
    pub async fn run(self, client: &StorefrontClient) -> Result<()> {
        match self {
            Command::Login { username, password } => {
                let password = match password {
                    Some(password) => password,
                    None => prompt("Password: ").await?,
                };
                let mut phase = client
                    .session()
                    .login(&username, Secret::new(password))
                    .await?;
                while phase == SessionPhase::PendingSecondFactor {
                    let code = prompt("Verification code: ").await?;
                    match client.session().verify_second_factor(&code).await {
                        Ok(next) => phase = next,
                        Err(e @ storefront::VerifyError::InvalidCode(_))
                        | Err(e @ storefront::VerifyError::Validation(_)) => {
                            println!("{e}");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                println!("Logged in, continue at {}", client.navigator().after_login());
            }
            Command::Logout => {
                client.session().logout();
                println!("Logged out");
            }
            Command::Whoami => match client.session().state().identity() {
                Some(identity) => println!(
                    "{} ({}){}",
                    identity.display_name(),
                    identity.role(),
                    identity
                        .expires_at()
                        .map(|exp| format!(", expires {exp}"))
                        .unwrap_or_default()
                ),
                None => println!("Not logged in"),
            },
            Command::Register {
                username,
                email,
                role,
            } => {
                let password = prompt("Password: ").await?;
                let confirmation = prompt("Confirm password: ").await?;
                let message = client
                    .registration()
                    .execute(
                        &username,
                        &email,
                        Secret::new(password),
                        Secret::new(confirmation),
                        role,
                    )
                    .await?;
                println!("{message}");
            }
            Command::ForgotUsername { email } => {
                println!("{}", client.recovery().forgot_username(&email).await?);
            }
            Command::ForgotPassword { email } => {
                println!("{}", client.recovery().forgot_password(&email).await?);
            }
            Command::ResetPassword { token } => {
                let password = prompt("New password: ").await?;
                let message = client
                    .recovery()
                    .reset_password(&token, Secret::new(password))
                    .await?;
                println!("{message}");
            }
            Command::Products(command) => command.run(client).await?,
            Command::Navigate { path } => {
                let navigation = client.navigator().visit(&path);
                match redirect_path(&navigation) {
                    Some(target) => println!("{path} -> {target}"),
                    None => println!("{path}: {navigation:?}"),
                }
            }
        }
        Ok(())
    }
}

impl ProductCommand {
    async fn run(self, client: &StorefrontClient) -> Result<()> {
        let result = match self {
            ProductCommand::List { search, page } => {
                let page = client.browser().fetch(client.query(search, page)).await?;
                for product in &page.products {
                    println!(
                        "{:<40} {:>10.2} {:>6}  {}",
                        product.name,
                        product.price,
                        product.quantity,
                        product.category.map(|c| c.wire_name()).unwrap_or("-")
                    );
                }
                println!("{} products, {} pages", page.total_items, page.total_pages);
                return Ok(());
            }
            ProductCommand::Show { name } => {
                let product = client.catalog().get(&name).await?;
                println!("{product:#?}");
                return Ok(());
            }
            ProductCommand::Create(args) => client.catalog().create(&args.into()).await,
            ProductCommand::Update {
                original_name,
                product,
            } => {
                let update = ProductUpdate {
                    original_name,
                    draft: product.into(),
                };
                client.catalog().update(&update).await
            }
            ProductCommand::Delete { name } => client.catalog().delete(&name).await,
        };

        match result {
            Ok(message) => {
                println!("{message}");
                Ok(())
            }
            Err(e @ storefront::CatalogError::Authorization(_)) => Err(eyre!(
                "{e}, log in again ({})",
                client.navigator().after_authorization_failure()
            )),
            Err(e) => Err(e.into()),
        }
    }
}
