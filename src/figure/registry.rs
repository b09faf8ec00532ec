//! Name → recipe builder lookup.

use super::catalog::{self, RecipeParams};
use super::recipe::Recipe;
use crate::error::{FigureError, Result};

pub type Builder = fn(&RecipeParams) -> Result<Recipe>;

struct Entry {
    name: &'static str,
    about: &'static str,
    build: Builder,
}

/// Registered figures, in registration order.
#[derive(Default)]
pub struct FigureRegistry {
    entries: Vec<Entry>,
}

impl FigureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every figure this crate ships.
    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(
            "simplest",
            "log variable without decorations, for movies",
            catalog::build_simplest,
        );
        r.register("simpler", "density slices and horizon magnetic flux", |_| catalog::simpler());
        r.register("simple", "density slices, accretion rate and horizon flux", |_| {
            catalog::simple()
        });
        r.register("traditional", "rho, UU and beta slices with accretion histories", |_| {
            catalog::traditional()
        });
        r.register("prims", "all primitive variables in one plane", catalog::build_prims);
        r.register("vecs_prim", "averaged density with primitive vector components", |_| {
            catalog::vecs_prim()
        });
        r.register("vecs_cov", "covariant u and b components", |_| catalog::vecs_cov());
        r.register("vecs_con", "contravariant u and b components", |_| catalog::vecs_con());
        r.register("ejection", "phi-averaged density and magnetic pressure", |_| {
            catalog::ejection()
        });
        r.register("b_bug", "raw magnetic field near the pole", |_| catalog::b_bug());
        r.register("e_ratio", "energy ratios and inversion failures", |_| catalog::e_ratio());
        r.register("e_ratio_funnel", "energy ratios on a theta-phi shell (needs radius)", |_| {
            catalog::e_ratio_funnel()
        });
        r.register("conservation", "integrated energy fluxes and failures by radius", |_| {
            catalog::conservation()
        });
        r.register("energies", "density, magnetic and internal energy with failures", |_| {
            catalog::energies()
        });
        r.register("floors", "floor hits by flag (KHARMA flags by default)", catalog::build_floors);
        r.register("fails", "inversion failures by status code", catalog::build_fails);
        r.register("old_floors", "floor hits with iharm3d flags", catalog::build_old_floors);
        r
    }

    /// Add or replace a figure.
    pub fn register(&mut self, name: &'static str, about: &'static str, build: Builder) {
        let entry = Entry { name, about, build };
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn describe(&self, name: &str) -> Result<&'static str> {
        self.entry(name).map(|e| e.about)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the named figure with `params`.
    pub fn build(&self, name: &str, params: &RecipeParams) -> Result<Recipe> {
        (self.entry(name)?.build)(params)
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| FigureError::UnknownRecipe(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_is_complete() {
        let r = FigureRegistry::standard();
        assert_eq!(r.len(), 17);
        for name in r.names() {
            let recipe = r.build(name, &RecipeParams::default()).unwrap();
            assert_eq!(recipe.name, name);
        }
    }

    #[test]
    fn unknown_names_are_errors() {
        let r = FigureRegistry::standard();
        assert!(matches!(
            r.build("nope", &RecipeParams::default()),
            Err(FigureError::UnknownRecipe(n)) if n == "nope"
        ));
        assert!(r.describe("nope").is_err());
    }

    #[test]
    fn register_replaces_by_name() {
        let mut r = FigureRegistry::new();
        r.register("x", "first", |_| catalog::simple());
        r.register("x", "second", |_| catalog::simpler());
        assert_eq!(r.len(), 1);
        assert_eq!(r.describe("x").unwrap(), "second");
        assert_eq!(r.build("x", &RecipeParams::default()).unwrap().name, "simpler");
    }
}
