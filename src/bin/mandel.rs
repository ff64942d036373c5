// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use log::info;
use num::Complex;
use std::path::Path;
use std::str::FromStr;

use mandel::{render_with_threads, ColoringMode, RenderRequest, Viewport};

/// Largest image side the command line accepts, in pixels.
const MAX_SIDE: usize = 10_000;

// "800x600" or "-0.5,0.25": two values around a separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let (l, r) = s.split_once(separator)?;
    Some((l.trim().parse().ok()?, r.trim().parse().ok()?))
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

fn check_pair<T: FromStr>(s: &str, separator: char, what: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_| ())
        .ok_or_else(|| format!("Could not parse {}", what))
}

fn check_size(s: &str) -> Result<(), String> {
    let (width, height) = parse_pair::<usize>(s, 'x')
        .ok_or_else(|| "Could not parse output image size".to_string())?;
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(format!("Image sides must be at most {} pixels", MAX_SIDE));
    }
    Ok(())
}

fn check_between<T>(s: &str, low: T, high: T, what: &str) -> Result<(), String>
where
    T: FromStr + PartialOrd + std::fmt::Display,
{
    let value = s
        .parse::<T>()
        .map_err(|_| format!("Could not parse {}", what))?;
    if value < low || value > high {
        return Err(format!("{} must be between {} and {}", what, low, high));
    }
    Ok(())
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const CENTER: &str = "center";
const RANGE: &str = "range";
const ZOOM: &str = "zoom";
const MODE: &str = "mode";
const QUICK: &str = "quick";
const NO_SUPERSAMPLE: &str = "no-supersample";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const DUMP_REQUEST: &str = "dump-request";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandel")
        .version("0.1.0")
        .about("Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required_unless(DUMP_REQUEST)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the extension picks the image format"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1600x1200")
                .validator(|s| check_size(&s))
                .help("Size of output image, at most 10000 pixels a side"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| check_pair::<f64>(&s, ',', "left lower corner"))
                .help("Left lower corner of the mandelbrot space [default: -2.0,-1.2]"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| check_pair::<f64>(&s, ',', "right upper corner"))
                .help("Right upper corner of the mandelbrot space [default: 1.0,1.2]"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .requires(RANGE)
                .conflicts_with_all(&[LEFTLOWER, RIGHTUPPER])
                .validator(|s| check_pair::<f64>(&s, ',', "center point"))
                .help("Center of the view; use with --range instead of the corners"),
        )
        .arg(
            Arg::with_name(RANGE)
                .required(false)
                .long(RANGE)
                .takes_value(true)
                .requires(CENTER)
                .validator(|s| check_between(&s, std::f64::MIN_POSITIVE, std::f64::MAX, "range"))
                .help("Width of the view along the real axis; the height follows the image aspect"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .validator(|s| check_between(&s, std::f64::MIN_POSITIVE, std::f64::MAX, "zoom factor"))
                .help("Scale the view about its center; below 1 zooms in"),
        )
        .arg(
            Arg::with_name(MODE)
                .required(false)
                .long(MODE)
                .short("m")
                .takes_value(true)
                .default_value("linear")
                .possible_values(&["linear", "sinusoidal", "smooth", "colormap", "distance", "rainbow"])
                .help("Coloring algorithm"),
        )
        .arg(
            Arg::with_name(QUICK)
                .long(QUICK)
                .short("q")
                .help("Quick preview: half the resolution, fewer iterations, no supersampling"),
        )
        .arg(
            Arg::with_name(NO_SUPERSAMPLE)
                .long(NO_SUPERSAMPLE)
                .help("Sample each pixel once instead of four times"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| check_between(&s, 1usize, 1024, "thread count"))
                .help("Number of threads to use in solver [default: max(cores, 4)]"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| check_between(&s, 1u32, 1_000_000, "iteration count"))
                .help("Fixed iteration cap instead of the zoom-based estimate"),
        )
        .arg(
            Arg::with_name(DUMP_REQUEST)
                .long(DUMP_REQUEST)
                .help("Print the render request as JSON and exit"),
        )
        .get_matches()
}

fn viewport(matches: &ArgMatches, width: usize, height: usize) -> Result<Viewport, Error> {
    let viewport = match matches.value_of(CENTER) {
        Some(center) => {
            let center =
                parse_complex(center).ok_or_else(|| format_err!("Error parsing center point"))?;
            let range = f64::from_str(matches.value_of(RANGE).unwrap_or_default())?;
            // Square pixels: the imaginary range follows the aspect ratio.
            let im_range = range * (height - 1) as f64 / (width - 1) as f64;
            Viewport::centered(center, range, im_range)?
        }
        None => {
            let default = Viewport::default();
            let leftlower = match matches.value_of(LEFTLOWER) {
                Some(s) => parse_complex(s).ok_or_else(|| format_err!("Error parsing left lower point"))?,
                None => Complex::new(default.min_re(), default.min_im()),
            };
            let rightupper = match matches.value_of(RIGHTUPPER) {
                Some(s) => parse_complex(s).ok_or_else(|| format_err!("Error parsing right upper point"))?,
                None => Complex::new(default.max_re(), default.max_im()),
            };
            Viewport::from_corners(leftlower, rightupper)?
        }
    };
    match matches.value_of(ZOOM) {
        Some(factor) => Ok(viewport.zoom(f64::from_str(factor)?)?),
        None => Ok(viewport),
    }
}

fn run() -> Result<(), Error> {
    let matches = args();
    let (width, height) = parse_pair::<usize>(matches.value_of(SIZE).unwrap_or_default(), 'x')
        .ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    if width < 2 || height < 2 {
        return Err(mandel::RenderError::InvalidRenderSize(width, height).into());
    }
    let mode = ColoringMode::from_str(matches.value_of(MODE).unwrap_or_default())
        .map_err(|e| format_err!("{}", e))?;
    let threads = match matches.value_of(THREADS) {
        Some(t) => usize::from_str(t)?,
        None => mandel::tiles::default_threads(),
    };

    let mut request = RenderRequest::new(viewport(&matches, width, height)?, width, height, mode)?
        .with_supersample(!matches.is_present(NO_SUPERSAMPLE));
    if matches.is_present(QUICK) {
        request = request.preview();
    }
    if let Some(iterations) = matches.value_of(ITERATIONS) {
        request = request.with_max_iterations(u32::from_str(iterations)?)?;
    }

    if matches.is_present(DUMP_REQUEST) {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let outfile = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("No output file given"))?;
    info!(
        "rendering {}x{} of re [{}, {}] im [{}, {}], {} iterations",
        request.width(),
        request.height(),
        request.viewport().min_re(),
        request.viewport().max_re(),
        request.viewport().min_im(),
        request.viewport().max_im(),
        request.max_iterations()
    );
    let raster = render_with_threads(&request, threads)?;
    let image = raster
        .into_image()
        .ok_or_else(|| format_err!("Raster does not match its own dimensions"))?;
    image.save(Path::new(outfile))?;
    info!("wrote {}", outfile);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
