//! The **SceneParser** reads a token stream front to back. Each
//! statement starts with a directive; the light registry is asked
//! first, then the shape registry, and the matching factory consumes
//! the statement's arguments through the `next_*` helpers below.
//! Composite factories call `parse_shape()` for their children, so
//! the recursion follows the nesting of the scene text.
//!
//! Files referenced by `fileInstance` get their own parser and token
//! stream. They share the registries, the instance cache and the base
//! directory of the enclosing scene.

// std
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
// others
use log::{debug, warn};
// rs_ray
use crate::core::animation::AffineChannel;
use crate::core::common::Float;
use crate::core::error::{Location, Result, SceneError};
use crate::core::geometry::{Point3f, Vector3f};
use crate::core::instance::{CachedInstance, InstanceCache};
use crate::core::lexer::{tokenize, Token, TokenKind, TokenStream};
use crate::core::light::Light;
use crate::core::registry::Registries;
use crate::core::scene::Scene;
use crate::core::shape::Shape;
use crate::core::spectrum::RGBSpectrum;
use crate::core::transform::{Matrix4x4, Transform};
use crate::shapes::fileinstance::FileInstance;
use crate::shapes::shapelist::ShapeList;

/// Nested shape statements deeper than this are rejected instead of
/// exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

pub struct SceneParser {
    stream: TokenStream,
    registries: Arc<Registries>,
    cache: Arc<InstanceCache>,
    base_dir: PathBuf,
    /// canonical paths of the files currently being parsed, outermost
    /// first
    in_progress: Vec<PathBuf>,
    /// directives whose arguments are being read, innermost last
    directives: Vec<String>,
    channels: Vec<Arc<AffineChannel>>,
    /// lights are ignored inside instanced files
    instanced: bool,
}

impl SceneParser {
    pub fn new(
        stream: TokenStream,
        registries: Arc<Registries>,
        cache: Arc<InstanceCache>,
        base_dir: &Path,
    ) -> Self {
        SceneParser {
            stream,
            registries,
            cache,
            base_dir: base_dir.to_path_buf(),
            in_progress: Vec::new(),
            directives: Vec::new(),
            channels: Vec::new(),
            instanced: false,
        }
    }
    /// Tokenize `input` and prepare a parser for it. `source` names
    /// the input in error locations.
    pub fn from_source(
        source: &str,
        input: &str,
        registries: Arc<Registries>,
        cache: Arc<InstanceCache>,
        base_dir: &Path,
    ) -> Result<Self> {
        let stream: TokenStream = tokenize(source, input)?;
        Ok(SceneParser::new(stream, registries, cache, base_dir))
    }
    /// Mark `path` as being parsed, so that references back to it are
    /// reported as cycles.
    pub fn with_file(mut self, path: &Path) -> Self {
        self.in_progress.push(path.to_path_buf());
        self
    }
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }
    pub fn cache(&self) -> &Arc<InstanceCache> {
        &self.cache
    }
    /// Dynamic channels declared so far.
    pub fn channels(&self) -> &[Arc<AffineChannel>] {
        &self.channels
    }

    /// Parse the whole stream into a scene. Either every statement is
    /// accepted or an error is returned and nothing survives.
    pub fn parse(mut self) -> Result<Scene> {
        let (shapes, lights) = self.parse_statements()?;
        debug!(
            "Parsed {}: {} shape(s), {} light(s), {} channel(s)",
            self.stream.source(),
            shapes.len(),
            lights.len(),
            self.channels.len()
        );
        Ok(Scene {
            shapes,
            lights,
            base_dir: self.base_dir,
            channels: self.channels,
        })
    }

    fn parse_statements(&mut self) -> Result<(Vec<Box<dyn Shape>>, Vec<Box<dyn Light>>)> {
        let mut shapes: Vec<Box<dyn Shape>> = Vec::new();
        let mut lights: Vec<Box<dyn Light>> = Vec::new();
        while !self.stream.is_exhausted() {
            let location: Location = self.stream.location();
            let directive: String = self.next_directive()?;
            let light_factory = self.registries.lights.get(&directive);
            if let Some(factory) = light_factory {
                self.directives.push(directive.clone());
                let light = factory.construct(self)?;
                self.directives.pop();
                if self.instanced {
                    warn!(
                        "{}: ignoring '{}' inside an instanced file",
                        location, directive
                    );
                } else {
                    lights.push(light);
                }
            } else {
                let factory = self.registries.resolve_shape(&directive, &location)?;
                self.directives.push(directive);
                let shape = factory.construct(self)?;
                self.directives.pop();
                shapes.push(shape);
            }
        }
        Ok((shapes, lights))
    }

    fn next_directive(&mut self) -> Result<String> {
        let location: Location = self.stream.location();
        match self.stream.next_token() {
            Some(Token {
                kind: TokenKind::Word,
                text,
                ..
            }) => Ok(text),
            Some(token) => Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("expected a directive, found '{}'", token.text),
            )),
            None => Err(SceneError::malformed(
                self.current_directive(),
                location,
                "expected a directive, found end of input",
            )),
        }
    }

    /// Parse one nested shape statement.
    pub fn parse_shape(&mut self) -> Result<Box<dyn Shape>> {
        let location: Location = self.stream.location();
        if self.directives.len() >= MAX_NESTING_DEPTH {
            return Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("shapes nested deeper than {} levels", MAX_NESTING_DEPTH),
            ));
        }
        let directive: String = self.next_directive()?;
        if self.registries.lights.contains(&directive) {
            return Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("light '{}' cannot be nested inside a shape", directive),
            ));
        }
        let factory = self.registries.resolve_shape(&directive, &location)?;
        self.directives.push(directive);
        let shape = factory.construct(self)?;
        self.directives.pop();
        Ok(shape)
    }

    /// The directive whose arguments are being read.
    pub fn current_directive(&self) -> String {
        self.directives.last().cloned().unwrap_or_default()
    }
    /// Number of tokens left. Counts read from the input are only
    /// trusted up to this for reserving memory.
    pub fn remaining_tokens(&self) -> usize {
        self.stream.remaining()
    }
    /// Location of the next token.
    pub fn location(&self) -> Location {
        self.stream.location()
    }
    /// A `MalformedScene` error at the next token.
    pub fn malformed(&self, message: impl Into<String>) -> SceneError {
        SceneError::malformed(self.current_directive(), self.location(), message)
    }

    fn expect_token(&mut self, what: &str) -> Result<Token> {
        match self.stream.next_token() {
            Some(token) => Ok(token),
            None => Err(self.malformed(format!("expected {}, found end of input", what))),
        }
    }
    /// The next token if it is a bare word, without consuming it.
    pub fn peek_word(&self) -> Option<&str> {
        match self.stream.peek() {
            Some(token) if token.kind == TokenKind::Word => Some(token.text.as_str()),
            _ => None,
        }
    }
    pub fn next_word(&mut self) -> Result<String> {
        let location: Location = self.location();
        let token: Token = self.expect_token("a word")?;
        if token.kind != TokenKind::Word {
            return Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("expected a word, found '{}'", token.text),
            ));
        }
        Ok(token.text)
    }
    /// A bare word or a quoted string.
    pub fn next_string(&mut self) -> Result<String> {
        let location: Location = self.location();
        let token: Token = self.expect_token("a string")?;
        match token.kind {
            TokenKind::Word | TokenKind::Quoted => Ok(token.text),
            _ => Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("expected a string, found '{}'", token.text),
            )),
        }
    }
    pub fn next_float(&mut self) -> Result<Float> {
        let location: Location = self.location();
        let token: Token = self.expect_token("a number")?;
        match token.text.parse::<Float>() {
            Ok(value) if token.kind == TokenKind::Word && value.is_finite() => Ok(value),
            _ => Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("expected a number, found '{}'", token.text),
            )),
        }
    }
    /// A number that has to be strictly positive, `what` names it in
    /// the error message.
    pub fn next_positive_float(&mut self, what: &str) -> Result<Float> {
        let location: Location = self.location();
        let value: Float = self.next_float()?;
        if value <= 0.0 {
            return Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("{} must be positive, found {}", what, value),
            ));
        }
        Ok(value)
    }
    pub fn next_usize(&mut self) -> Result<usize> {
        let location: Location = self.location();
        let token: Token = self.expect_token("a count")?;
        match token.text.parse::<usize>() {
            Ok(value) if token.kind == TokenKind::Word => Ok(value),
            _ => Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("expected a non-negative integer, found '{}'", token.text),
            )),
        }
    }
    pub fn next_point3f(&mut self) -> Result<Point3f> {
        Ok(Point3f {
            x: self.next_float()?,
            y: self.next_float()?,
            z: self.next_float()?,
        })
    }
    pub fn next_vector3f(&mut self) -> Result<Vector3f> {
        Ok(Vector3f {
            x: self.next_float()?,
            y: self.next_float()?,
            z: self.next_float()?,
        })
    }
    pub fn next_spectrum(&mut self) -> Result<RGBSpectrum> {
        Ok(RGBSpectrum::rgb(
            self.next_float()?,
            self.next_float()?,
            self.next_float()?,
        ))
    }
    /// A bracketed transform block. Operations compose left to right,
    /// `[ A B ]` yields `A * B`.
    pub fn next_transform(&mut self) -> Result<Transform> {
        let location: Location = self.location();
        let open: Token = self.expect_token("'['")?;
        if open.kind != TokenKind::OpenBracket {
            return Err(SceneError::malformed(
                self.current_directive(),
                location,
                format!("expected '[', found '{}'", open.text),
            ));
        }
        let mut transform: Transform = Transform::default();
        loop {
            let location: Location = self.location();
            let token: Token = self.expect_token("a transform operation or ']'")?;
            if token.kind == TokenKind::CloseBracket {
                return Ok(transform);
            }
            let op: Transform = match (token.kind, token.text.as_str()) {
                (TokenKind::Word, "translate") => Transform::translate(&self.next_vector3f()?),
                (TokenKind::Word, "scale") => {
                    let s: Vector3f = self.next_vector3f()?;
                    Transform::scale(s.x, s.y, s.z).ok_or_else(|| {
                        SceneError::malformed(
                            self.current_directive(),
                            location.clone(),
                            "scale factors must be non-zero",
                        )
                    })?
                }
                (TokenKind::Word, "rotate") => {
                    let degrees: Float = self.next_float()?;
                    let axis: Vector3f = self.next_vector3f()?;
                    Transform::rotate(degrees, &axis).ok_or_else(|| {
                        SceneError::malformed(
                            self.current_directive(),
                            location.clone(),
                            "rotation axis must not be zero",
                        )
                    })?
                }
                (TokenKind::Word, "matrix") => {
                    let mut m: Matrix4x4 = Matrix4x4::default();
                    for row in m.m.iter_mut() {
                        for value in row.iter_mut() {
                            *value = self.next_float()?;
                        }
                    }
                    Transform::from_matrix(m).ok_or_else(|| {
                        SceneError::malformed(
                            self.current_directive(),
                            location.clone(),
                            "matrix is singular",
                        )
                    })?
                }
                _ => {
                    return Err(SceneError::malformed(
                        self.current_directive(),
                        location,
                        format!("unknown transform operation '{}'", token.text),
                    ))
                }
            };
            transform = transform * op;
        }
    }

    /// Make a dynamic channel available to the scene. The same channel
    /// may be added repeatedly (a file instanced twice), but two
    /// different channels cannot share a name.
    pub fn add_channel(&mut self, channel: Arc<AffineChannel>) -> Result<()> {
        if let Some(existing) = self.channels.iter().find(|c| c.name() == channel.name()) {
            if Arc::ptr_eq(existing, &channel) {
                return Ok(());
            }
            return Err(self.malformed(format!(
                "dynamic channel '{}' is declared twice",
                channel.name()
            )));
        }
        self.channels.push(channel);
        Ok(())
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let p: &Path = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Shared subtree of the scene file at `path`, parsed on first
    /// use. Relative paths are resolved against the base directory.
    pub fn instance(&mut self, path: &str, location: Location) -> Result<Arc<dyn Shape>> {
        let directive: String = FileInstance::DIRECTIVE.to_string();
        let requested: PathBuf = self.resolve_path(path);
        let resolved: PathBuf = match fs::canonicalize(&requested) {
            Ok(resolved) => resolved,
            Err(source) => {
                return Err(SceneError::MissingReference {
                    directive,
                    location,
                    path: requested.clone(),
                    source: Box::new(SceneError::Io {
                        path: requested,
                        source,
                    }),
                })
            }
        };
        if self.in_progress.contains(&resolved) {
            let mut chain: Vec<PathBuf> = self.in_progress.clone();
            chain.push(resolved.clone());
            return Err(SceneError::CyclicReference {
                directive,
                location,
                path: resolved,
                chain,
            });
        }
        let registries: Arc<Registries> = self.registries.clone();
        let cache: Arc<InstanceCache> = self.cache.clone();
        let base_dir: PathBuf = self.base_dir.clone();
        let mut in_progress: Vec<PathBuf> = self.in_progress.clone();
        in_progress.push(resolved.clone());
        let result = self.cache.get_or_parse(&resolved, || {
            let input: String = fs::read_to_string(&resolved).map_err(|source| SceneError::Io {
                path: resolved.clone(),
                source,
            })?;
            let stream: TokenStream = tokenize(&resolved.display().to_string(), &input)?;
            let mut child = SceneParser {
                stream,
                registries,
                cache,
                base_dir,
                in_progress,
                directives: Vec::new(),
                channels: Vec::new(),
                instanced: true,
            };
            let (shapes, _lights) = child.parse_statements()?;
            debug!(
                "Parsed instanced file {} with {} shape(s)",
                resolved.display(),
                shapes.len()
            );
            Ok(CachedInstance {
                shape: Arc::new(ShapeList::new(shapes)),
                channels: child.channels,
            })
        });
        match result {
            Ok(cached) => {
                for channel in cached.channels {
                    self.add_channel(channel)?;
                }
                Ok(cached.shape)
            }
            Err(err @ SceneError::CyclicReference { .. }) => Err(err),
            Err(err) => Err(SceneError::MissingReference {
                directive,
                location,
                path: resolved,
                source: Box::new(err),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parser(input: &str) -> SceneParser {
        SceneParser::from_source(
            "test",
            input,
            Arc::new(Registries::with_builtins().unwrap()),
            Arc::new(InstanceCache::new()),
            Path::new("."),
        )
        .unwrap()
    }

    #[test]
    fn floats_and_counts() {
        let mut p = parser("1.5 -2e1 3 x");
        assert_relative_eq!(p.next_float().unwrap(), 1.5);
        assert_relative_eq!(p.next_float().unwrap(), -20.0);
        assert_eq!(p.next_usize().unwrap(), 3);
        let err = p.next_float().unwrap_err();
        assert!(matches!(err, SceneError::MalformedScene { ref location, .. } if location.col == 12));
    }

    #[test]
    fn exhausted_stream_is_malformed() {
        let mut p = parser("1 2");
        let err = p.next_point3f().unwrap_err();
        assert!(matches!(err, SceneError::MalformedScene { .. }));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let mut p = parser("inf NaN");
        assert!(p.next_float().is_err());
        assert!(p.next_float().is_err());
    }

    #[test]
    fn transform_block_composes_left_to_right() {
        let mut p = parser("[ translate 1 0 0 scale 2 2 2 ]");
        let t = p.next_transform().unwrap();
        let q = t.transform_point(&Point3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(q.x, 3.0);
        assert!(p.stream.is_exhausted());
    }

    #[test]
    fn transform_block_errors() {
        assert!(parser("translate 1 0 0").next_transform().is_err());
        assert!(parser("[ scale 0 1 1 ]").next_transform().is_err());
        assert!(parser("[ shear 1 ]").next_transform().is_err());
        assert!(parser("[ translate 1 0 0").next_transform().is_err());
        let singular = "[ matrix 1 0 0 0  0 0 0 0  0 0 1 0  0 0 0 1 ]";
        assert!(parser(singular).next_transform().is_err());
    }

    #[test]
    fn light_inside_shape_list_is_rejected() {
        let err = parser("shapeList 1 pointLight 1 1 1 0 0 0 1 0 0")
            .parse()
            .err()
            .unwrap();
        assert!(matches!(err, SceneError::MalformedScene { ref directive, .. } if directive == "shapeList"));
    }

    #[test]
    fn missing_file_is_a_missing_reference() {
        let err = parser("fileInstance does/not/exist.ray [ ]")
            .parse()
            .err()
            .unwrap();
        match err {
            SceneError::MissingReference { path, source, .. } => {
                assert!(path.ends_with("does/not/exist.ray"));
                assert!(matches!(*source, SceneError::Io { .. }));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn channel_names_must_be_unique() {
        let mut p = parser("");
        let a = Arc::new(AffineChannel::new("spin", Transform::default()));
        let b = Arc::new(AffineChannel::new("spin", Transform::default()));
        assert!(p.add_channel(a.clone()).is_ok());
        assert!(p.add_channel(a).is_ok());
        assert!(p.add_channel(b).is_err());
        assert_eq!(p.channels().len(), 1);
    }
}
