//! Interfaz de línea de comandos: extrae la metadata de una imagen y guarda el reporte.

use crate::advanced_metadata::deep::HIDDEN_METADATA_ERROR;
use crate::advanced_metadata::header::DECODE_ERROR;
use crate::error::{MetadataError, Result};
use crate::logging;
use crate::metadata::{
    self, DEFAULT_REPORT_NAME, EXIF_ERROR, ExportFormat, ExtractOptions, MergePolicy,
    MetadataRecord, parse_export_format,
};
use crate::{APP_NAME, PUBLISHER};
use log::{LevelFilter, warn};
use std::ffi::OsString;
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
Uso: imglens [OPCIONES] <RUTA>

Opciones:
  -o, --output <ARCHIVO>   Ruta del reporte (por defecto metadata.txt)
  -f, --format <txt|json>  Formato del reporte (por defecto txt)
      --keep-shadowed      Conserva los valores sobrescritos como \"<Clave> (<etapa>)\"
      --no-deep-scan       Omite el escaneo profundo de metadata oculta
  -v, --verbose            Muestra el progreso de cada etapa
  -q, --quiet              Solo muestra errores
      --about              Información de la aplicación
  -V, --version            Versión
  -h, --help               Esta ayuda";

#[derive(Debug, PartialEq)]
pub struct ExtractArgs {
    pub path: PathBuf,
    pub output: PathBuf,
    pub format: ExportFormat,
    pub options: ExtractOptions,
    pub log_level: LevelFilter,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Extract(ExtractArgs),
    About,
    Version,
    Help,
}

pub fn run() -> Result<()> {
    let args = std::env::args_os().skip(1).collect();
    match parse_args(args)? {
        Command::Help => println!("{USAGE}"),
        Command::Version => println!("{APP_NAME} {VERSION}"),
        Command::About => println!("{}", about()),
        Command::Extract(args) => {
            logging::init(args.log_level);
            run_extract(&args)?;
        }
    }
    Ok(())
}

pub fn parse_args(args: Vec<OsString>) -> Result<Command> {
    let mut args = pico_args::Arguments::from_vec(args);

    if args.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }
    if args.contains(["-V", "--version"]) {
        return Ok(Command::Version);
    }
    if args.contains("--about") {
        return Ok(Command::About);
    }

    let format = args
        .opt_value_from_fn(["-f", "--format"], parse_export_format)
        .map_err(usage_error)?
        .unwrap_or_default();
    let output: Option<PathBuf> = args
        .opt_value_from_str(["-o", "--output"])
        .map_err(usage_error)?;
    let keep_shadowed = args.contains("--keep-shadowed");
    let no_deep_scan = args.contains("--no-deep-scan");
    let verbose = args.contains(["-v", "--verbose"]);
    let quiet = args.contains(["-q", "--quiet"]);

    let log_level = match (verbose, quiet) {
        (true, true) => {
            return Err(MetadataError::Usage(
                "--verbose y --quiet no se pueden combinar".to_string(),
            ));
        }
        (true, false) => LevelFilter::Debug,
        (false, true) => LevelFilter::Error,
        (false, false) => LevelFilter::Warn,
    };

    let mut free = args.finish().into_iter();
    let path = match (free.next(), free.next()) {
        (Some(path), None) => PathBuf::from(path),
        (None, _) => {
            return Err(MetadataError::Usage(format!(
                "Falta la ruta de la imagen\n\n{USAGE}"
            )));
        }
        (Some(_), Some(extra)) => {
            return Err(MetadataError::Usage(format!(
                "Argumento inesperado: `{}`",
                extra.to_string_lossy()
            )));
        }
    };
    if path.to_string_lossy().starts_with('-') {
        return Err(MetadataError::Usage(format!(
            "Opción no reconocida: `{}`",
            path.display()
        )));
    }

    let options = ExtractOptions {
        deep_scan: !no_deep_scan,
        merge: if keep_shadowed {
            MergePolicy::KeepShadowed
        } else {
            MergePolicy::Overwrite
        },
        ..ExtractOptions::default()
    };

    Ok(Command::Extract(ExtractArgs {
        path,
        output: output.unwrap_or_else(|| default_output(format)),
        format,
        options,
        log_level,
    }))
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let record = metadata::extract_with(&args.path, &args.options)?;
    let degraded = degraded_entries(&record);
    if !degraded.is_empty() {
        warn!(
            "Registro incompleto para `{}`: {}",
            args.path.display(),
            degraded.join("; ")
        );
    }

    metadata::write_report(&record, &args.output, args.format)?;
    println!(
        "Metadata de `{}` guardada en {} ({} entradas)",
        args.path.display(),
        args.output.display(),
        record.len()
    );
    Ok(())
}

/// Entradas de error que dejaron las etapas degradadas.
fn degraded_entries(record: &MetadataRecord) -> Vec<String> {
    [DECODE_ERROR, EXIF_ERROR, HIDDEN_METADATA_ERROR]
        .into_iter()
        .filter_map(|key| record.get(key).map(|value| format!("{key}: {value}")))
        .collect()
}

fn default_output(format: ExportFormat) -> PathBuf {
    match format {
        ExportFormat::Txt => PathBuf::from(DEFAULT_REPORT_NAME),
        other => PathBuf::from(format!("metadata.{}", other.extension())),
    }
}

fn about() -> String {
    format!("{APP_NAME}\nVersión {VERSION}\nPublicado por {PUBLISHER}")
}

fn usage_error(error: pico_args::Error) -> MetadataError {
    MetadataError::Usage(error.to_string())
}
