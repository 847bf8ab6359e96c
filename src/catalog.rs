use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Painting {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub thumbnail_url: String,
    pub materials: Vec<String>,
    pub dimensions: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
    #[serde(default)]
    pub original_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media<'a> {
    pub kind: MediaKind,
    pub url: &'a str,
    pub label: String,
}

impl Painting {
    pub fn has_discount(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }

    /// Media strip for the detail view: video first, then the main image, then
    /// the additional images.
    pub fn media(&self) -> Vec<Media<'_>> {
        let mut media = Vec::with_capacity(self.additional_images.len() + 2);
        if let Some(video) = self.video_url.as_deref() {
            media.push(Media {
                kind: MediaKind::Video,
                url: video,
                label: "Video".to_string(),
            });
        }
        media.push(Media {
            kind: MediaKind::Image,
            url: self.image_url.as_str(),
            label: "Main view".to_string(),
        });
        for (i, url) in self.additional_images.iter().enumerate() {
            media.push(Media {
                kind: MediaKind::Image,
                url: url.as_str(),
                label: format!("Detail {}", i + 1),
            });
        }
        media
    }

    /// The index of the main image within [`Painting::media`].
    pub fn main_media_index(&self) -> usize {
        usize::from(self.video_url.is_some())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} by {} | {} | {} | {}",
            self.name,
            self.artist,
            format_price(self.price),
            self.dimensions,
            self.materials.join(", ")
        )
    }
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Reads a JSON array of paintings.
pub fn load_catalog(path: &Path) -> Result<Vec<Painting>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read catalog {}", path.display()))?;
    let paintings = parse_catalog(&raw)
        .with_context(|| format!("invalid catalog {}", path.display()))?;
    info!(count = paintings.len(), path = %path.display(), "catalog loaded");
    Ok(paintings)
}

pub fn parse_catalog(raw: &str) -> Result<Vec<Painting>> {
    Ok(serde_json::from_str(raw)?)
}

fn piece(
    id: &str,
    name: &str,
    artist: &str,
    description: &str,
    price: f64,
    materials: &[&str],
    dimensions: &str,
) -> Painting {
    let base = "https://res.cloudinary.com/dlc5hg3hn/image/upload";
    Painting {
        id: id.to_string(),
        name: name.to_string(),
        artist: artist.to_string(),
        description: description.to_string(),
        price,
        image_url: format!("{base}/{id}.jpg"),
        thumbnail_url: format!("{base}/w_400/{id}.jpg"),
        materials: materials.iter().map(|m| m.to_string()).collect(),
        dimensions: dimensions.to_string(),
        video_url: None,
        additional_images: Vec::new(),
        original_price: None,
    }
}

pub fn builtin_catalog() -> Vec<Painting> {
    let mut lapis = piece(
        "lapis-twilight",
        "Lapis Twilight",
        "Mira Kowalczyk",
        "A night sky over the Southern Alps, laid in crushed lapis lazuli with flecks of pyrite for stars.",
        1450.0,
        &["Lapis Lazuli", "Pyrite", "Resin"],
        "30x24 inches",
    );
    lapis.video_url = Some("https://res.cloudinary.com/dlc5hg3hn/video/upload/lapis-twilight.mp4".to_string());
    lapis.additional_images = vec![
        "https://res.cloudinary.com/dlc5hg3hn/image/upload/lapis-twilight-detail-1.jpg".to_string(),
        "https://res.cloudinary.com/dlc5hg3hn/image/upload/lapis-twilight-detail-2.jpg".to_string(),
    ];

    let mut amethyst = piece(
        "amethyst-bloom",
        "Amethyst Bloom",
        "Aroha Ngata",
        "Layered amethyst petals opening from a rose quartz heart.",
        1150.0,
        &["Amethyst", "Rose Quartz"],
        "24x20 inches",
    );
    amethyst.original_price = Some(1350.0);

    let mut turquoise = piece(
        "turquoise-tide",
        "Turquoise Tide",
        "Daniel Reyes",
        "Rolling surf built from turquoise and malachite chips over a mother-of-pearl shore.",
        1950.0,
        &["Turquoise", "Malachite", "Mother of Pearl"],
        "40x30 inches",
    );
    turquoise.additional_images =
        vec!["https://res.cloudinary.com/dlc5hg3hn/image/upload/turquoise-tide-detail-1.jpg".to_string()];

    vec![
        lapis,
        amethyst,
        turquoise,
        piece(
            "citrine-dawn",
            "Citrine Dawn",
            "Mira Kowalczyk",
            "Morning light over wheat fields, rendered in citrine and tiger's eye.",
            850.0,
            &["Citrine", "Tiger's Eye"],
            "16x20 inches",
        ),
        piece(
            "jade-garden",
            "Jade Garden",
            "Li Wen",
            "A quiet courtyard garden in nephrite jade with an onyx moon gate.",
            1600.0,
            &["Nephrite Jade", "Onyx"],
            "36x24 inches",
        ),
        piece(
            "garnet-ember",
            "Garnet Ember",
            "Aroha Ngata",
            "Glowing embers of garnet and carnelian drifting over smoky quartz.",
            990.0,
            &["Garnet", "Carnelian", "Smoky Quartz"],
            "20x20 inches",
        ),
    ]
}
