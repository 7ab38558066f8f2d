//! splat4d-export: Convert a mesh into per-frame Gaussian splat artifacts
//!
//! Usage:
//!   splat4d-export --mesh bunny.obj --out splats/
//!   splat4d-export --mesh bunny.obj --out splats/ --frames 1,5,12 --autosize
//!   splat4d-export --mesh bunny.obj --out splats/ --job job.json --verify

use rand::rngs::StdRng;
use rand::SeedableRng;
use splat4d_rs::export::{run_export, ExportJob, SampleMode, StaticMeshEvaluator};
use splat4d_rs::io::{load_obj, load_ply, PlyFormat};
use std::path::PathBuf;

fn main() {
    env_logger::init();
    println!("splat4d-export v{}", splat4d_rs::VERSION);

    // Parse command-line arguments
    let mut args = std::env::args().skip(1);
    let mut mesh_path: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut job_path: Option<PathBuf> = None;
    let mut frames: Option<Vec<i32>> = None;
    let mut mode: Option<SampleMode> = None;
    let mut splat_scale: Option<f32> = None;
    let mut opacity: Option<f32> = None;
    let mut autosize = false;
    let mut autosize_gain: Option<f32> = None;
    let mut ascii = false;
    let mut transform_script = false;
    let mut base_color: Option<[f32; 4]> = None;
    let mut seed: u64 = 0;
    let mut verify = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mesh" => {
                mesh_path = Some(PathBuf::from(args.next().expect("Missing --mesh argument")));
            }
            "--out" => {
                out_dir = Some(PathBuf::from(args.next().expect("Missing --out argument")));
            }
            "--job" => {
                job_path = Some(PathBuf::from(args.next().expect("Missing --job argument")));
            }
            "--frames" => {
                let list = args.next().expect("Missing --frames argument");
                let parsed: Vec<i32> = list
                    .split(',')
                    .map(|s| s.trim().parse().expect("Invalid frame number"))
                    .collect();
                frames = Some(parsed);
            }
            "--vertices" => {
                mode = Some(SampleMode::Vertices);
            }
            "--surface-density" => {
                let density = args
                    .next()
                    .expect("Missing --surface-density argument")
                    .parse()
                    .expect("Invalid density");
                mode = Some(SampleMode::Surface { density });
            }
            "--splat-scale" => {
                splat_scale = Some(
                    args.next()
                        .expect("Missing --splat-scale argument")
                        .parse()
                        .expect("Invalid splat scale"),
                );
            }
            "--opacity" => {
                opacity = Some(
                    args.next()
                        .expect("Missing --opacity argument")
                        .parse()
                        .expect("Invalid opacity"),
                );
            }
            "--autosize" => {
                autosize = true;
            }
            "--autosize-gain" => {
                autosize_gain = Some(
                    args.next()
                        .expect("Missing --autosize-gain argument")
                        .parse()
                        .expect("Invalid autosize gain"),
                );
            }
            "--ascii" => {
                ascii = true;
            }
            "--transform-script" => {
                transform_script = true;
            }
            "--base-color" => {
                let rgba_str = args.next().expect("Missing --base-color argument");
                let parts: Vec<f32> = rgba_str
                    .split(',')
                    .map(|s| s.parse().expect("Invalid base color"))
                    .collect();
                if parts.len() != 4 {
                    eprintln!("Error: --base-color must be four comma-separated floats (e.g., '1,0,0,0.5')");
                    std::process::exit(1);
                }
                base_color = Some([parts[0], parts[1], parts[2], parts[3]]);
            }
            "--seed" => {
                seed = args
                    .next()
                    .expect("Missing --seed argument")
                    .parse()
                    .expect("Invalid seed");
            }
            "--verify" => {
                verify = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // Load the mesh
    let mesh_path = mesh_path.expect("Missing --mesh argument");
    println!("Loading mesh from {:?}...", mesh_path);
    let mut mesh = match load_obj(&mesh_path) {
        Ok(mesh) => mesh,
        Err(e) => {
            eprintln!("Error: failed to load mesh: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "Loaded '{}': {} vertices, {} faces, color source: {}",
        mesh.name,
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.active_color.as_deref().unwrap_or("none")
    );

    if let Some(rgba) = base_color {
        mesh.base_color = Some(rgba);
    }

    // Build the job: start from a JSON job file when given, flags override.
    let mut job = if let Some(path) = &job_path {
        let text = std::fs::read_to_string(path).expect("Failed to read job file");
        serde_json::from_str::<ExportJob>(&text).expect("Failed to parse job JSON")
    } else {
        let out_dir = out_dir.clone().expect("Missing --out argument");
        ExportJob::new(mesh.name.clone(), out_dir)
    };

    if let Some(dir) = out_dir {
        job.output_dir = dir;
    }
    if let Some(frames) = frames {
        job.frames = frames;
    }
    if let Some(mode) = mode {
        job.mode = mode;
    }
    if let Some(scale) = splat_scale {
        job.global_size = scale;
    }
    if let Some(opacity) = opacity {
        job.global_opacity = opacity;
    }
    if autosize {
        job.autosize = true;
    }
    if let Some(gain) = autosize_gain {
        job.autosize_gain = gain;
    }
    if ascii {
        job.format = PlyFormat::Ascii;
    }
    if transform_script {
        job.write_transform_script = true;
    }

    if let Err(e) = std::fs::create_dir_all(&job.output_dir) {
        eprintln!("Error: cannot create output directory: {}", e);
        std::process::exit(1);
    }

    println!(
        "Exporting {} frame(s) to {:?} ({:?}, autosize: {})...",
        job.frames.len(),
        job.output_dir,
        job.format,
        job.autosize
    );

    // Run
    let mut evaluator = StaticMeshEvaluator::new(mesh);
    let mut rng = StdRng::seed_from_u64(seed);
    let report = match run_export(&job, &mut evaluator, &mut rng) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Export failed: {}", e);
            std::process::exit(1);
        }
    };

    for artifact in &report.artifacts {
        println!(
            "  frame {:>5}: {} splats -> {:?}",
            artifact.frame, artifact.splat_count, artifact.path
        );
    }
    println!(
        "Wrote {} artifact(s), {} splats total",
        report.artifacts.len(),
        report.total_splats()
    );

    // Optionally parse everything back and compare counts.
    if verify {
        println!("Verifying artifacts...");
        for artifact in &report.artifacts {
            let cloud = match load_ply(&artifact.path) {
                Ok(cloud) => cloud,
                Err(e) => {
                    eprintln!("Verification failed for {:?}: {}", artifact.path, e);
                    std::process::exit(1);
                }
            };
            if cloud.len() != artifact.splat_count || cloud.frame != artifact.frame {
                eprintln!(
                    "Verification failed for {:?}: expected frame {} with {} splats, parsed frame {} with {}",
                    artifact.path, artifact.frame, artifact.splat_count, cloud.frame, cloud.len()
                );
                std::process::exit(1);
            }
        }
        println!("All {} artifact(s) parse back cleanly", report.artifacts.len());
    }

    println!("Done!");
}

fn print_help() {
    println!(
        r#"splat4d-export: Convert a mesh into per-frame Gaussian splat artifacts

USAGE:
    splat4d-export --mesh MESH.obj --out DIR [OPTIONS]

REQUIRED:
    --mesh PATH              Input mesh (OBJ, vertex-color extension supported)
    --out DIR                Output directory for PLY artifacts

OPTIONS:
    --job PATH               Load an ExportJob from a JSON file (flags override it)
    --frames F1,F2,...       Frame labels to export, ascending [default: 1]
    --vertices               One splat per mesh vertex (default mode)
    --surface-density D      Sample the surface with D splats per square unit
    --splat-scale S          Base splat size in world units [default: 0.05]
    --opacity O              Global opacity multiplier in [0,1] [default: 1.0]
    --autosize               Scale each splat by its nearest-neighbor distance
    --autosize-gain G        Distance-to-scale gain for --autosize [default: 1.0]
    --ascii                  Write ASCII PLY instead of binary
    --transform-script       Write a companion .transform.json next to each artifact
    --base-color R,G,B,A     Fallback color when the mesh has no vertex colors
    --seed N                 RNG seed for surface sampling [default: 0]
    --verify                 Parse artifacts back after writing and check counts
    --help, -h               Print this help message

EXAMPLES:
    # One splat per vertex, three frames
    splat4d-export --mesh bunny.obj --out splats/ --frames 1,5,12

    # Surface sampling with density-adaptive sizing
    splat4d-export --mesh bunny.obj --out splats/ --surface-density 200 --autosize

    # Uniform red, half-transparent splats, ASCII output
    splat4d-export --mesh plain.obj --out splats/ --base-color 1,0,0,0.5 --ascii
"#
    );
}
