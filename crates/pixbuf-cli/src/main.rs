//! pixbuf - Inspect, resize, rotate and pack images
//!
//! A command-line front end for the pixbuf engine. XPM is decoded by the
//! library itself, PNG and JPEG through the `image` crate.

use clap::{Parser, Subcommand, ValueEnum};
use pixbuf::{
    adaptive_palette, pack_buffer, scale, transform, ChannelOrder, DisplayFormat, ImageFormat,
    ImageLoader, LoaderRegistry, PixbufError, PixelBuffer, Transform, TrueColorDepth,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pixbuf")]
#[command(version)]
#[command(about = "Inspect, resize, rotate and pack images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dimensions and channel layout
    Info {
        /// Input image file (XPM, PNG, JPEG)
        input: PathBuf,
    },

    /// Scale, rotate and flip an image, writing PNG
    Convert {
        /// Input image file (XPM, PNG, JPEG)
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Target size as WIDTHxHEIGHT
        #[arg(short, long, value_parser = parse_size)]
        size: Option<(u32, u32)>,

        /// Clockwise rotation in degrees (90, 180 or 270)
        #[arg(short, long, value_parser = parse_rotation)]
        rotate: Option<Transform>,

        /// Mirror the image
        #[arg(short, long)]
        flip: Option<FlipAxis>,
    },

    /// Pack the first row of an image into display pixel codes
    Pack {
        /// Input image file (XPM, PNG, JPEG)
        input: PathBuf,

        /// Bits per pixel (15, 16, 24 or 32 for true color, 1-16 with --gray)
        #[arg(short, long, default_value = "24")]
        depth: u8,

        /// Channel order of the display, high bits first
        #[arg(short, long, value_enum, default_value = "rgb")]
        order: Order,

        /// Pack for a grayscale display
        #[arg(short, long, conflicts_with = "palette")]
        gray: bool,

        /// Pack for an indexed display with an adaptive palette of this many colors (2-256)
        #[arg(short, long)]
        palette: Option<u16>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FlipAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Rgb,
    Rbg,
    Brg,
    Bgr,
    Grb,
    Gbr,
}

impl From<Order> for ChannelOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Rgb => ChannelOrder::Rgb,
            Order::Rbg => ChannelOrder::Rbg,
            Order::Brg => ChannelOrder::Brg,
            Order::Bgr => ChannelOrder::Bgr,
            Order::Grb => ChannelOrder::Grb,
            Order::Gbr => ChannelOrder::Gbr,
        }
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h.parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}

fn parse_rotation(s: &str) -> Result<Transform, String> {
    match s {
        "90" => Ok(Transform::Rotate90),
        "180" => Ok(Transform::Rotate180),
        "270" => Ok(Transform::Rotate270),
        _ => Err(format!("rotation must be 90, 180 or 270, got '{s}'")),
    }
}

/// PNG and JPEG through the `image` crate.
struct ImageCrateLoader;

impl ImageLoader for ImageCrateLoader {
    fn load(&self, path: &Path) -> pixbuf::Result<PixelBuffer> {
        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) => PixbufError::Io(io),
            other => PixbufError::UnsupportedFormat(other.to_string()),
        })?;
        if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            PixelBuffer::from_raw_channels(rgba.into_raw(), width, height, 4)
        } else {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            PixelBuffer::from_raw_channels(rgb.into_raw(), width, height, 3)
        }
    }
}

fn registry() -> LoaderRegistry {
    let mut registry = LoaderRegistry::with_defaults();
    registry.register(ImageFormat::Png, ImageCrateLoader);
    registry.register(ImageFormat::Jpeg, ImageCrateLoader);
    registry
}

fn load(input: &Path) -> Result<PixelBuffer, Box<dyn std::error::Error>> {
    registry()
        .load(input)
        .map_err(|e| format!("Failed to open '{}': {}", input.display(), e).into())
}

fn save_png(img: &PixelBuffer, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (img.width(), img.height());
    if img.has_alpha() {
        image::RgbaImage::from_raw(width, height, img.as_bytes().to_vec())
            .ok_or("Failed to create image from pixel data")?
            .save(path)?;
    } else {
        image::RgbImage::from_raw(width, height, img.as_bytes().to_vec())
            .ok_or("Failed to create image from pixel data")?
            .save(path)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => {
            let img = load(&input)?;
            println!("{}", input.display());
            println!("  size:     {}x{}", img.width(), img.height());
            println!("  alpha:    {}", if img.has_alpha() { "yes" } else { "no" });
            println!("  channels: {}", img.channel_count());
            println!("  stride:   {} bytes", img.stride());
        }

        Commands::Convert {
            input,
            output,
            size,
            rotate,
            flip,
        } => {
            let mut img = load(&input)?;
            eprintln!(
                "Converting '{}' ({}x{})",
                input.display(),
                img.width(),
                img.height()
            );

            if let Some((width, height)) = size {
                img = scale(&img, width, height)?;
                eprintln!("Scaled to {width}x{height}");
            }
            if let Some(rotation) = rotate {
                img = transform(&img, rotation)?;
                eprintln!("Rotated ({rotation:?})");
            }
            if let Some(axis) = flip {
                let t = match axis {
                    FlipAxis::Horizontal => Transform::FlipHorizontal,
                    FlipAxis::Vertical => Transform::FlipVertical,
                };
                img = transform(&img, t)?;
                eprintln!("Flipped ({t:?})");
            }

            save_png(&img, &output)?;
            eprintln!(
                "Written {}x{} pixels to '{}'",
                img.width(),
                img.height(),
                output.display()
            );
        }

        Commands::Pack {
            input,
            depth,
            order,
            gray,
            palette,
        } => {
            let img = load(&input)?;

            let format = if gray {
                DisplayFormat::grayscale(depth)?
            } else if let Some(colors) = palette {
                let entries = adaptive_palette(&img, colors)?;
                eprintln!("Adaptive palette: {} colors", entries.len());
                DisplayFormat::indexed(entries)?
            } else {
                DisplayFormat::TrueColor {
                    depth: TrueColorDepth::try_from(depth)?,
                    order: order.into(),
                }
            };

            let mut codes = pack_buffer(&img, &format);
            codes.truncate(img.width() as usize);

            eprintln!("Packing row 0 of '{}' ({} pixels)", input.display(), codes.len());
            let width: usize = if gray { 4 } else { 8 };
            for chunk in codes.chunks(8) {
                let line: Vec<String> = chunk
                    .iter()
                    .map(|c| format!("{c:0width$x}"))
                    .collect();
                println!("{}", line.join(" "));
            }
        }
    }

    Ok(())
}
