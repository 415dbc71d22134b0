//! Splat attribute arrays.

pub use crate::error::Error;

use humansize::{format_size, BINARY};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use std::fmt;

/// The provider of splat attributes, e.g., a scene file decoder.
pub trait AttributeSource {
    /// `N`
    fn splat_count(&self) -> usize;

    /// Filling the centers, `[N, 3]`.
    fn fill_positions(
        &self,
        positions: &mut [f32],
    );

    /// Filling the upper triangles of covariances, `[N, 6]`.
    ///
    /// The order is `[xx, xy, xz, yy, yz, zz]`.
    fn fill_covariances(
        &self,
        covariances: &mut [f32],
    );

    /// Filling the colors in RGBA, `[N, 4]`.
    fn fill_colors(
        &self,
        colors: &mut [u8],
    );
}

#[derive(Clone, Default, PartialEq)]
pub struct SplatScene {
    /// `[N, 4]` packed into `[N]` as `r | g << 8 | b << 16 | a << 24`
    pub colors: Vec<u32>,
    /// `[N, 6]`
    pub covariances: Vec<f32>,
    /// `[N, 3]`
    pub positions: Vec<f32>,
}

impl SplatScene {
    /// Creating a scene from the raw attribute arrays.
    pub fn new(
        positions: Vec<f32>,
        covariances: Vec<f32>,
        colors_rgba: &[u8],
    ) -> Result<Self, Error> {
        let splat_count = positions.len() / 3;

        if splat_count == 0 {
            return Err(Error::Validation(
                "splat count".into(),
                "positive".into(),
            ));
        }
        if positions.len() != splat_count * 3 {
            return Err(Error::Validation(
                format!("positions.len() ({})", positions.len()),
                format!("a multiple of 3 ({})", splat_count * 3),
            ));
        }
        if covariances.len() != splat_count * 6 {
            return Err(Error::Validation(
                format!("covariances.len() ({})", covariances.len()),
                format!("{}", splat_count * 6),
            ));
        }
        if colors_rgba.len() != splat_count * 4 {
            return Err(Error::Validation(
                format!("colors.len() ({})", colors_rgba.len()),
                format!("{}", splat_count * 4),
            ));
        }
        if splat_count > u32::MAX as usize {
            return Err(Error::Validation(
                format!("splat count ({splat_count})"),
                format!("no more than {}", u32::MAX),
            ));
        }

        let colors = colors_rgba
            .chunks_exact(4)
            .map(|c| Self::pack_color([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self {
            colors,
            covariances,
            positions,
        })
    }

    /// Reading all attributes from the source.
    pub fn from_source(source: &impl AttributeSource) -> Result<Self, Error> {
        let splat_count = source.splat_count();

        let mut positions = Vec::new();
        let mut covariances = Vec::new();
        let mut colors_rgba = Vec::new();
        positions.try_reserve_exact(splat_count * 3)?;
        covariances.try_reserve_exact(splat_count * 6)?;
        colors_rgba.try_reserve_exact(splat_count * 4)?;
        positions.resize(splat_count * 3, 0.0);
        covariances.resize(splat_count * 6, 0.0);
        colors_rgba.resize(splat_count * 4, 0);

        source.fill_positions(&mut positions);
        source.fill_covariances(&mut covariances);
        source.fill_colors(&mut colors_rgba);

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::scene",
            "from_source > splat_count ({splat_count})",
        );

        Self::new(positions, covariances, &colors_rgba)
    }

    /// A synthetic scene of `splat_count` splats.
    ///
    /// The centers follow a standard normal distribution,
    /// the covariances are isotropic and the colors are opaque.
    pub fn random(
        splat_count: usize,
        seed: u64,
    ) -> Result<Self, Error> {
        let rng = &mut StdRng::seed_from_u64(seed);
        let positions = StandardNormal
            .sample_iter(&mut *rng)
            .take(splat_count * 3)
            .collect();
        let covariances = (0..splat_count)
            .flat_map(|_| {
                let variance = rng.gen_range(1e-4_f32..1e-2);
                [variance, 0.0, 0.0, variance, 0.0, variance]
            })
            .collect();
        let colors_rgba = (0..splat_count)
            .flat_map(|_| {
                let [r, g, b] = rng.gen::<[u8; 3]>();
                [r, g, b, u8::MAX]
            })
            .collect::<Vec<_>>();

        Self::new(positions, covariances, &colors_rgba)
    }
}

/// Properties
impl SplatScene {
    /// `N`
    #[inline]
    pub fn splat_count(&self) -> usize {
        self.colors.len()
    }

    /// The center of the splat at `index`.
    #[inline]
    pub fn position(
        &self,
        index: usize,
    ) -> [f32; 3] {
        let p = &self.positions[index * 3..index * 3 + 3];
        [p[0], p[1], p[2]]
    }

    /// The color of the splat at `index` in RGBA.
    #[inline]
    pub fn color(
        &self,
        index: usize,
    ) -> [u8; 4] {
        Self::unpack_color(self.colors[index])
    }

    /// Packing RGBA into `r | g << 8 | b << 16 | a << 24`.
    #[inline]
    pub const fn pack_color(rgba: [u8; 4]) -> u32 {
        u32::from_le_bytes(rgba)
    }

    /// Unpacking [`SplatScene::pack_color`].
    #[inline]
    pub const fn unpack_color(color: u32) -> [u8; 4] {
        color.to_le_bytes()
    }

    /// Size of the attributes in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        size_of_val(self.colors.as_slice())
            + size_of_val(self.covariances.as_slice())
            + size_of_val(self.positions.as_slice())
    }

    /// Readable size of the attributes.
    #[inline]
    pub fn size_readable(&self) -> String {
        format_size(self.size(), BINARY.decimal_places(1))
    }
}

impl AttributeSource for SplatScene {
    fn splat_count(&self) -> usize {
        self.splat_count()
    }

    fn fill_positions(
        &self,
        positions: &mut [f32],
    ) {
        positions.copy_from_slice(&self.positions);
    }

    fn fill_covariances(
        &self,
        covariances: &mut [f32],
    ) {
        covariances.copy_from_slice(&self.covariances);
    }

    fn fill_colors(
        &self,
        colors: &mut [u8],
    ) {
        colors
            .chunks_exact_mut(4)
            .zip(&self.colors)
            .for_each(|(target, &color)| {
                target.copy_from_slice(&Self::unpack_color(color))
            });
    }
}

impl fmt::Debug for SplatScene {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("SplatScene")
            .field("splat_count()", &self.splat_count())
            .field("size_readable()", &self.size_readable())
            .finish()
    }
}
