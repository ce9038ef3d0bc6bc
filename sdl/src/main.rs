use std::{
    fs, process,
    sync::mpsc,
    time::{Duration, Instant},
};

use clap::{value_t, App, Arg, ArgMatches};
use log::{error, info, warn};
use notify::Watcher;
use raytracer::demo::canned_scene;
use sdl::{parse_and_render, InterpretError, RenderSettings};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new("Scene Language Ray Tracer")
        .version("1.0")
        .about("Renders scenes described in a small stack-based scene language")
        .arg(
            Arg::with_name("SOURCE")
                .help("The source file. Renders a built-in scene when omitted")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .help("The output file. Defaults to the name the program asks for")
                .required(false),
        )
        .arg(
            Arg::with_name("samples")
                .long("samples")
                .takes_value(true)
                .help("Jittered samples per pixel")
                .required(false),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .help("Seed for the sampling jitter, for repeatable images")
                .required(false),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .takes_value(true)
                .default_value("640")
                .help("Image width of the built-in scene"),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .takes_value(true)
                .default_value("400")
                .help("Image height of the built-in scene"),
        )
        .arg(
            Arg::with_name("watch")
                .long("watch")
                .short("w")
                .help("Whether or not to watch the source file and rerender on save")
                .required(false),
        )
        .get_matches();

    if matches.is_present("watch") {
        let source = match matches.value_of("SOURCE") {
            Some(source) => source,
            None => {
                error!("--watch needs a source file");
                process::exit(2);
            }
        };

        if let Err(e) = watch(&matches, source) {
            error!("Failed to watch {}: {}", source, e);
            process::exit(1);
        }
    } else if let Err(e) = render(&matches) {
        error!("Failed to render: {}", e);
        process::exit(1);
    }
}

fn settings(matches: &ArgMatches) -> RenderSettings {
    RenderSettings {
        samples: matches
            .value_of("samples")
            .map(|_| value_t!(matches, "samples", u32).unwrap_or_else(|e| e.exit())),
        seed: matches
            .value_of("seed")
            .map(|_| value_t!(matches, "seed", u64).unwrap_or_else(|e| e.exit())),
    }
}

fn render(matches: &ArgMatches) -> Result<(), InterpretError> {
    let now = Instant::now();
    let settings = settings(matches);
    let output = matches.value_of("output");

    let source = match matches.value_of("SOURCE") {
        Some(source) => source,
        None => {
            let width = value_t!(matches, "width", u32).unwrap_or_else(|e| e.exit());
            let height = value_t!(matches, "height", u32).unwrap_or_else(|e| e.exit());

            let mut scene = canned_scene(width, height);
            if let Some(samples) = settings.samples {
                scene.options.samples = samples;
            }
            scene.options.seed = settings.seed;

            let path = output.unwrap_or("render.png");
            scene.render().to_image().save(path)?;
            info!("Built-in scene written to {} in {}s", path, now.elapsed().as_secs_f32());
            return Ok(());
        }
    };

    let text = fs::read_to_string(source)?;
    let rendered = parse_and_render(&text, &settings)?;
    info!("Scene constructed and rendered in {}s", now.elapsed().as_secs_f32());

    if output.is_some() && rendered.len() > 1 {
        warn!("program rendered {} images, each overwrites the last at the output path", rendered.len());
    }

    for image in rendered {
        let path = output.unwrap_or(&image.file);
        image.image.to_image().save(path)?;
        info!("Wrote {}", path);
    }

    info!("Operation complete in {}s", now.elapsed().as_secs_f32());
    Ok(())
}

fn watch(matches: &ArgMatches, source: &str) -> notify::Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::watcher(tx, Duration::from_millis(500))?;
    watcher.watch(source, notify::RecursiveMode::NonRecursive)?;

    info!("Now listening for file changes at {}", source);
    if let Err(e) = render(matches) {
        error!("Failed to render: {}", e);
    }

    loop {
        match rx.recv() {
            Ok(notify::DebouncedEvent::Write(_)) => {
                if let Err(e) = render(matches) {
                    error!("Failed to render: {}", e);
                }
            }
            Ok(notify::DebouncedEvent::Error(e, _)) => return Err(e),
            Ok(_) => (),
            Err(e) => {
                return Err(notify::Error::Generic(format!("watcher channel closed: {}", e)));
            }
        }
    }
}
