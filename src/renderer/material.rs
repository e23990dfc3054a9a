//! Surface materials

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Material properties as laid out in the shader
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Base color (RGB)
    pub color: [f32; 3],
    /// Specular strength
    pub specular: f32,
    /// Shininess exponent
    pub shininess: f32,
    /// 1.0 samples the checker texture, 0.0 uses the base color only
    pub use_texture: f32,
    _padding: [f32; 2],
}

/// Which texture a material samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialTexture {
    /// Solid base color
    #[default]
    None,
    /// Procedural checkerboard tinted by the base color
    Checker,
}

/// Material definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color
    pub color: Vec3,
    /// Specular reflectivity (0.0 - 1.0)
    pub specular: f32,
    /// Shininess exponent
    pub shininess: f32,
    pub texture: MaterialTexture,
}

impl Material {
    /// Create a new material with a color
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            specular: 0.5,
            shininess: 32.0,
            texture: MaterialTexture::None,
        }
    }

    /// Create a diffuse material (no specular)
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            specular: 0.0,
            shininess: 1.0,
            ..Self::new(color)
        }
    }

    /// Checkerboard tinted by `tint`
    pub fn checker(tint: Vec3) -> Self {
        Self {
            specular: 0.1,
            texture: MaterialTexture::Checker,
            ..Self::new(tint)
        }
    }

    /// Convert to uniform data
    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            color: self.color.into(),
            specular: self.specular,
            shininess: self.shininess,
            use_texture: match self.texture {
                MaterialTexture::None => 0.0,
                MaterialTexture::Checker => 1.0,
            },
            _padding: [0.0; 2],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec3::new(0.8, 0.8, 0.8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
        let uniform = Material::checker(Vec3::ONE).to_uniform();
        assert_eq!(uniform.use_texture, 1.0);
        assert_eq!(Material::diffuse(Vec3::X).to_uniform().specular, 0.0);
    }
}
