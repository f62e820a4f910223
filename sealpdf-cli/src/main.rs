use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sealpdf::{
    save_to_file, Literal, Object, ObjectGraph, ObjectId, Operator, PdfVersion, PermissionFlags,
    PrintingPermission, SecurityConfig, WriterConfig,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "sealpdf",
    about = "Build PDF documents and protect them with the standard security handler",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a one-page PDF, optionally password protected
    Create {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Document title stored in the Info dictionary
        #[arg(short, long)]
        title: Option<String>,

        /// PDF version; selects the encryption algorithm (1.3 .. 1.7, 1.7ext3)
        #[arg(long, default_value = "1.7")]
        pdf_version: PdfVersion,

        /// Password required to open the document
        #[arg(long)]
        user_password: Option<String>,

        /// Password granting full access
        #[arg(long)]
        owner_password: Option<String>,

        /// Printing permission for the user password
        #[arg(long, value_enum, default_value_t = PrintArg::None)]
        allow_print: PrintArg,

        #[arg(long)]
        allow_modify: bool,

        #[arg(long)]
        allow_copy: bool,

        #[arg(long)]
        allow_annotate: bool,

        #[arg(long)]
        allow_forms: bool,

        #[arg(long)]
        allow_accessibility: bool,

        #[arg(long)]
        allow_assembly: bool,

        /// Write content streams uncompressed
        #[arg(long)]
        no_compress: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PrintArg {
    None,
    Low,
    High,
}

impl From<PrintArg> for PrintingPermission {
    fn from(arg: PrintArg) -> Self {
        match arg {
            PrintArg::None => PrintingPermission::None,
            PrintArg::Low => PrintingPermission::LowResolution,
            PrintArg::High => PrintingPermission::HighResolution,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            output,
            title,
            pdf_version,
            user_password,
            owner_password,
            allow_print,
            allow_modify,
            allow_copy,
            allow_annotate,
            allow_forms,
            allow_accessibility,
            allow_assembly,
            no_compress,
        } => {
            let mut graph = build_document(pdf_version, title.as_deref())
                .context("Failed to build document")?;

            let security = if user_password.is_some() || owner_password.is_some() {
                let mut config = SecurityConfig::new().with_permissions(PermissionFlags {
                    printing: allow_print.into(),
                    modifying: allow_modify,
                    copying: allow_copy,
                    annotating: allow_annotate,
                    filling_forms: allow_forms,
                    content_accessibility: allow_accessibility,
                    document_assembly: allow_assembly,
                });
                if let Some(password) = user_password {
                    config = config.with_user_password(password);
                }
                if let Some(password) = owner_password {
                    config = config.with_owner_password(password);
                }
                Some(config)
            } else {
                None
            };

            let writer_config = WriterConfig {
                compress_content_streams: !no_compress,
                ..WriterConfig::default()
            };
            save_to_file(&mut graph, &output, security.as_ref(), writer_config)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            tracing::info!(
                "Created {} (PDF {}, {})",
                output.display(),
                pdf_version,
                if security.is_some() { "encrypted" } else { "unencrypted" }
            );
            println!("✓ Created PDF: {}", output.display());
        }
    }

    Ok(())
}

/// Catalog, page tree and a single US Letter page with a framed box.
fn build_document(version: PdfVersion, title: Option<&str>) -> sealpdf::Result<ObjectGraph> {
    let mut graph = ObjectGraph::new();
    graph.set_version(version);

    let pages = graph.next_ref();
    let content = graph.content_stream(
        vec![
            Operator::push_graphics_state(),
            Operator::new("w", vec![2.into()]),
            Operator::new(
                "re",
                vec![72.into(), 72.into(), 468.into(), 648.into()],
            ),
            Operator::of("S"),
            Operator::pop_graphics_state(),
        ],
        Literal::Absent,
    )?;
    let content = graph.register(content);

    let page = graph.obj(Literal::dict([
        ("Type", Literal::from("Page")),
        ("Parent", Literal::from(pages)),
        (
            "MediaBox",
            Literal::array([0.into(), 0.into(), 612.into(), 792.into()]),
        ),
        ("Resources", Literal::dict::<&str, _>([])),
        ("Contents", Literal::from(content)),
    ]));
    let page = graph.register(page);

    let tree = graph.obj(Literal::dict([
        ("Type", Literal::from("Pages")),
        ("Kids", Literal::array([Literal::from(page)])),
        ("Count", Literal::from(1)),
    ]));
    graph.assign(pages, tree)?;

    let catalog = graph.obj(Literal::dict([
        ("Type", Literal::from("Catalog")),
        ("Pages", Literal::from(pages)),
    ]));
    let root = graph.register(catalog);
    graph.trailer_mut().root = Some(root);

    let info = info_dictionary(&mut graph, title);
    graph.trailer_mut().info = Some(info);
    Ok(graph)
}

fn info_dictionary(graph: &mut ObjectGraph, title: Option<&str>) -> ObjectId {
    let producer = format!("sealpdf {}", sealpdf::VERSION);
    let info = graph.obj(Literal::dict([
        ("Title", Literal::from(title.map(Object::string))),
        ("Producer", Literal::from(Object::string(producer))),
    ]));
    graph.register(info)
}
