use clap::Parser;
use preview_core::{DEFAULT_LANGUAGE_ICON, LANGUAGE_ICON_TABLE};

/// Prints the language icon table.
#[derive(Parser, Debug, Clone)]
pub struct Languages {
    /// Print `language=icon` pairs, one per line.
    #[clap(long)]
    pub plain: bool,
}

impl Languages {
    pub fn run(&self) {
        let width = LANGUAGE_ICON_TABLE
            .iter()
            .map(|(language, _)| language.len())
            .max()
            .unwrap_or_default();

        for (language, icon) in LANGUAGE_ICON_TABLE {
            if self.plain {
                println!("{language}={icon}");
            } else {
                println!("{language:<width$}  {icon}");
            }
        }

        if self.plain {
            println!("*={DEFAULT_LANGUAGE_ICON}");
        } else {
            println!("{:<width$}  {DEFAULT_LANGUAGE_ICON}", "*");
        }
    }
}
