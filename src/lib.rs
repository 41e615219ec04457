//! Raster image helpers on an explicit off-screen drawing context.
//!
//! Buffers are immutable [`RasterBuffer`]s; every factory and transform returns a new one as
//! an [`ImageResult`], so chains short-circuit on the first failure:
//!
//! ```no_run
//! use imagehelper::{Color, ContentMode, Size, solid_color};
//!
//! let avatar = solid_color(Color::from_hex("#0080ff")?, Size::new(320.0, 200.0))?
//!     .resize(Size::new(128.0, 128.0), ContentMode::ScaleAspectFill)?
//!     .round_corners_to_circle_with_border(4.0, Color::WHITE)?;
//! imagehelper::save_png(&avatar, "avatar.png")?;
//! # Ok::<(), imagehelper::ImageError>(())
//! ```
//!
//! Remote images go through a [`RemoteImageCache`], which fetches on a background pool and
//! delivers completions on a [`CallbackQueue`] owned by the caller.

#![forbid(unsafe_code)]

mod assets;
mod draw;
mod effects;
mod factory;
mod foundation;
mod gallery;
mod raster;
mod remote;
mod settings;
mod transform;

pub use assets::catalog::{AssetCatalog, IMAGE_EXTENSIONS};
pub use assets::decode::{decode_image, encode_png, save_png};
pub use draw::context::DrawingContext;
pub use draw::text::Font;
pub use effects::BlurEffect;
pub use factory::{
    Drawable, from_snapshot, linear_gradient, radial_gradient, solid_color, text_label,
};
pub use foundation::core::{
    Affine, BezPath, Color, ColorStop, ContentMode, MAX_DIMENSION, Point, Rect, Size,
    TextAlignment, Vec2, pixel_dimensions,
};
pub use foundation::error::{ImageError, ImageResult};
pub use gallery::{
    CELL_POINTS, GalleryItem, GalleryManifest, GallerySection, ManifestItem, ManifestSection,
    contact_sheet, demo_sections, sample_photo, web_image_item,
};
pub use raster::buffer::{AlphaMode, ChannelLayout, PixelFormat, RasterBuffer};
pub use raster::composite::{
    BlendMode, PremulF32, PremulRgba8, blend, crossfade, crossfade_in_place, over, over_in_place,
};
pub use remote::cache::{EntryState, RemoteImageCache};
pub use remote::fetch::{DefaultCodec, FileFetcher, Fetcher, ImageCodec};
pub use remote::queue::{CallbackQueue, CallbackSender};
pub use remote::slot::{Crossfade, FADE_DURATION, ImageSlot};
pub use settings::{FetchSettings, Interpolation, RenderSettings};
