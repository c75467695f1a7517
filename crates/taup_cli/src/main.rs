mod request;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use request::{ServiceRequest, ServiceResponse, ReceiverArrivals, ResponseArrival};
use taup_core::{AuxiliaryData, EngineError, OpenFlags, PhaseFilter, ReceiverGeometry, Session, SessionOptions};
use taup_model::{Model, ModelError, Tolerances};

const EXIT_SUCCESS: i32 = 0;
const EXIT_MODEL_READ_FAILED: i32 = 202;
const EXIT_MODEL_MALFORMED: i32 = 203;
const EXIT_TAU_INTEGRAL_FAILURE: i32 = 204;
const EXIT_PHASE_LIST_MALFORMED: i32 = 205;
/// Not one of the four documented model/session failure codes; used for
/// errors the CLI surface itself can't classify into them (bad CLI input,
/// a depth outside the model's range, I/O on the request/response files).
const EXIT_GENERIC_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "taup", version, about = "Seismic travel-time engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a model, start one session, and print travel times for one
    /// distance or a full plot sweep.
    Local {
        #[arg(long)]
        model_path: Option<PathBuf>,
        #[arg(long, default_value = "ak135")]
        earth_model: String,
        #[arg(long)]
        serialized_path: PathBuf,
        #[arg(long)]
        source_depth_km: f64,
        #[arg(long)]
        log_path: Option<PathBuf>,
        #[arg(long, default_value = "info")]
        log_level: String,
        /// Distance in degrees for a single travel-time query; when absent,
        /// runs a plot sweep out to `max_delta_deg` instead.
        #[arg(long)]
        delta_deg: Option<f64>,
        #[arg(long, default_value_t = 180.0)]
        max_delta_deg: f64,
        #[arg(long, default_value_t = 3600.0)]
        max_time_s: f64,
        #[arg(long, default_value_t = 1.0)]
        delta_step_deg: f64,
    },
    /// Read a request file, compute travel times, write a response file.
    Service {
        #[arg(long)]
        model_path: Option<PathBuf>,
        #[arg(long)]
        serialized_path: PathBuf,
        #[arg(long)]
        request_path: PathBuf,
        #[arg(long)]
        response_path: PathBuf,
        #[arg(long, default_value = "info")]
        log_level: String,
    },
    /// Open a model and report the same exit codes as `local`, without
    /// computing travel times.
    Validate {
        #[arg(long)]
        model_path: Option<PathBuf>,
        #[arg(long, default_value = "ak135")]
        earth_model: String,
        #[arg(long)]
        serialized_path: PathBuf,
        #[arg(long, default_value = "info")]
        log_level: String,
    },
}

fn init_logging(level: &str) {
    let filter = level.parse().unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new().filter_level(filter).init();
}

fn exit_code_for(err: &EngineError) -> i32 {
    match err {
        EngineError::Model(ModelError::ModelReadFailure(_)) => EXIT_MODEL_READ_FAILED,
        EngineError::Model(ModelError::MalformedFile(_))
        | EngineError::Model(ModelError::SerializationMismatch(_))
        | EngineError::Model(ModelError::InvalidBranchData(_)) => EXIT_MODEL_MALFORMED,
        EngineError::Model(ModelError::DepthTooDeep { .. }) => EXIT_GENERIC_FAILURE,
        EngineError::TauIntegralFailure(_) | EngineError::Branch(_) => EXIT_TAU_INTEGRAL_FAILURE,
        EngineError::PhaseListInvalid(_) => EXIT_PHASE_LIST_MALFORMED,
        EngineError::DepthOutOfRange { .. } => EXIT_GENERIC_FAILURE,
        _ => EXIT_GENERIC_FAILURE,
    }
}

fn load_model(model_name: &str, model_path: Option<&PathBuf>, serialized_path: &PathBuf) -> Result<Model, EngineError> {
    taup_core::open_model(
        model_name,
        model_path.map(PathBuf::as_path),
        serialized_path,
        OpenFlags::default(),
        Tolerances::default(),
    )
}

fn fail(err: &EngineError) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(exit_code_for(err));
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Local {
            model_path,
            earth_model,
            serialized_path,
            source_depth_km,
            log_path: _,
            log_level,
            delta_deg,
            max_delta_deg,
            max_time_s,
            delta_step_deg,
        } => {
            init_logging(&log_level);
            let model = load_model(&earth_model, model_path.as_ref(), &serialized_path).unwrap_or_else(|e| fail(&e));
            let session = Session::new_session(
                &model,
                source_depth_km,
                PhaseFilter::All,
                SessionOptions::default(),
                AuxiliaryData::default(),
            )
            .unwrap_or_else(|e| fail(&e));

            match delta_deg {
                Some(delta_deg) => {
                    let arrivals = session.get_tt(ReceiverGeometry::Distance {
                        delta_deg,
                        azimuth_deg: None,
                        receiver_elev_km: 0.0,
                    });
                    for arrival in &arrivals {
                        println!(
                            "{:<8} t={:>9.3}s  p={:>8.4} s/rad  dt/dDelta={:>7.4} s/deg",
                            arrival.phase_code, arrival.time_s, arrival.ray_parameter_s_per_rad, arrival.dt_ddelta_s_per_deg
                        );
                    }
                }
                None => {
                    let tracks = taup_core::plot(&session, max_delta_deg, max_time_s, delta_step_deg);
                    for (phase, track) in &tracks {
                        println!("{phase}: {} points", track.len());
                    }
                }
            }
        }

        Commands::Service { model_path, serialized_path, request_path, response_path, log_level } => {
            init_logging(&log_level);
            let text = std::fs::read_to_string(&request_path).unwrap_or_else(|e| {
                eprintln!("Error reading request file: {e}");
                std::process::exit(EXIT_GENERIC_FAILURE);
            });
            let request: ServiceRequest = serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing request file: {e}");
                std::process::exit(EXIT_GENERIC_FAILURE);
            });

            let model =
                load_model(&request.model_name, model_path.as_ref(), &serialized_path).unwrap_or_else(|e| fail(&e));
            let phase_filter = match &request.phases {
                Some(names) => PhaseFilter::Named(names.clone()),
                None => PhaseFilter::All,
            };
            let options = SessionOptions {
                tectonic: request.tectonic,
                return_all_phases: request.return_all_phases,
                return_back_branches: request.return_back_branches,
                ..SessionOptions::default()
            };
            let session =
                Session::new_session(&model, request.source_depth_km, phase_filter, options, AuxiliaryData::default())
                    .unwrap_or_else(|e| fail(&e));

            let receivers = request
                .receivers
                .iter()
                .map(|r| {
                    let arrivals = session.get_tt(ReceiverGeometry::from(r));
                    ReceiverArrivals { arrivals: arrivals.iter().map(ResponseArrival::from).collect() }
                })
                .collect();
            let response = ServiceResponse { receivers };

            let body = serde_json::to_string_pretty(&response).expect("response always serializes");
            std::fs::write(&response_path, body).unwrap_or_else(|e| {
                eprintln!("Error writing response file: {e}");
                std::process::exit(EXIT_GENERIC_FAILURE);
            });
        }

        Commands::Validate { model_path, earth_model, serialized_path, log_level } => {
            init_logging(&log_level);
            match load_model(&earth_model, model_path.as_ref(), &serialized_path) {
                Ok(model) => {
                    println!("Model {earth_model:?} is valid: {} branches", model.branches().len());
                    std::process::exit(EXIT_SUCCESS);
                }
                Err(e) => fail(&e),
            }
        }
    }
}
