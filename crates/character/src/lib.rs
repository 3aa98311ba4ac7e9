//! # Character Compositing
//!
//! Turns a photo of an everyday object into a small character: the object is
//! segmented with [`object_mask`], tinted with the photo's dominant colour,
//! given eyes and a mouth, and described by a one-line persona.
//!
//! ```rust,no_run
//! use character::{AssetLibrary, CharacterStudio, Style};
//! use rand::SeedableRng;
//!
//! let photo = object_mask::load_rgb("mug.jpg")?;
//! let studio = CharacterStudio::default().with_assets(AssetLibrary::new("assets"));
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
//!
//! let character = studio.create(&photo, Style::Cute, &mut rng)?;
//! character.image.save("mug_character.png")?;
//! println!("{}", character.persona);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod config;
pub mod style;
pub mod color;
pub mod assets;
pub mod compose;
pub mod persona;
pub mod studio;

pub use error::{CharacterError, Result};
pub use config::CharacterConfig;
pub use style::Style;
pub use color::{dominant_color, tint_overlay};
pub use assets::{AssetLibrary, FaceAssets};
pub use compose::{FacePlacement, compose_character, face_placement};
pub use persona::{PersonaLanguage, generate_persona, generate_persona_in};
pub use studio::{Character, CharacterStudio};
