//! RS-274X extended command interpreter
//!
//! Extended commands sit between `%` delimiters and configure the image
//! before any drawing happens:
//!
//! ```text
//! %FSLAX24Y24*%
//! %MOIN*%
//! %ADD10C,0.010*%
//! ```
//!
//! [`Rs274xInterpreter::parse_extended_block`] reads one `%...%` block,
//! dispatching each two-letter command to its handler. A failing handler
//! never aborts the block: the cursor is moved to the next `*` or `%`
//! and parsing resumes there. Only running out of input is fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use gerbkit_core::{IntPoint, Message, MessageLevel, MessageLog, Units};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::aperture::{ApertureDefinition, ApertureShape, ApertureTable, DrillShape};
use crate::command::CommandCode;
use crate::config::{ConfigResult, InterpreterConfig};
use crate::cursor::LineCursor;
use crate::error::{CommandError, CommandResult, Rs274xError, Rs274xResult};
use crate::format::{CoordinateNotation, ZeroSuppression};
use crate::image::{ImageState, Polarity};
use crate::include::{FsIncludeResolver, IncludeResolver};
use crate::macros::{read_macro, ApertureMacro, MacroSet};
use crate::scanner::{read_command_code, read_double, read_int, skip_to_block_end};

/// Result of dispatching one command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The command changed the image state
    Applied,
    /// Recognised, but has no effect here
    Ignored,
    /// The handler rejected the command
    Failed(CommandError),
}

impl CommandOutcome {
    /// `false` only for [`CommandOutcome::Failed`]
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Counters accumulated over everything parsed by one interpreter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    pub extended_blocks: usize,
    pub commands: usize,
    pub failed_commands: usize,
    pub ignored_commands: usize,
    /// Ordinary `*`-terminated data blocks skipped for the plotter
    pub data_blocks: usize,
}

/// Interpreter for the extended commands of one Gerber layer
pub struct Rs274xInterpreter {
    config: InterpreterConfig,
    image: ImageState,
    apertures: ApertureTable,
    macros: MacroSet,
    messages: MessageLog,
    resolver: Box<dyn IncludeResolver>,
    summary: ParseSummary,
}

impl std::fmt::Debug for Rs274xInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rs274xInterpreter")
            .field("config", &self.config)
            .field("image", &self.image)
            .field("defined_apertures", &self.apertures.defined().count())
            .field("macros", &self.macros.len())
            .field("messages", &self.messages.len())
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl Default for Rs274xInterpreter {
    fn default() -> Self {
        Self::build(InterpreterConfig::default())
    }
}

impl Rs274xInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interpreter from a validated configuration
    pub fn with_config(config: InterpreterConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: InterpreterConfig) -> Self {
        let resolver = Box::new(FsIncludeResolver::new(config.include_dir.clone()));
        Self {
            apertures: ApertureTable::new(config.first_dcode, config.last_dcode),
            image: ImageState::new(),
            macros: MacroSet::new(),
            messages: MessageLog::new(),
            summary: ParseSummary::default(),
            resolver,
            config,
        }
    }

    /// Replace the include file resolver
    pub fn with_resolver(mut self, resolver: impl IncludeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn image(&self) -> &ImageState {
        &self.image
    }

    pub fn apertures(&self) -> &ApertureTable {
        &self.apertures
    }

    pub fn macros(&self) -> &MacroSet {
        &self.macros
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn summary(&self) -> ParseSummary {
        self.summary
    }

    /// Hand the parsed layer to a consumer
    pub fn into_parts(self) -> (ImageState, ApertureTable, MacroSet, MessageLog) {
        (self.image, self.apertures, self.macros, self.messages)
    }

    /// Internal units per current image unit
    pub fn conversion_scale(&self) -> f64 {
        self.image
            .units
            .conversion_scale(self.config.internal_units_per_inch)
    }

    /// Cursor over `reader` sized by the configured line capacity
    pub fn cursor(&self, reader: impl BufRead + 'static) -> LineCursor {
        LineCursor::with_capacity(reader, self.config.line_buffer_capacity)
    }

    pub fn parse_str(&mut self, text: &str) -> Rs274xResult<ParseSummary> {
        let mut cursor = self.cursor(std::io::Cursor::new(text.as_bytes().to_vec()));
        self.parse_stream(&mut cursor)
    }

    pub fn parse_file(&mut self, path: &Path) -> Rs274xResult<ParseSummary> {
        let file = File::open(path)?;
        debug!(path = %path.display(), "parsing gerber file");
        let mut cursor = self.cursor(BufReader::new(file));
        self.parse_stream(&mut cursor)
    }

    /// Read a whole layer: every extended block is interpreted, data
    /// blocks are skipped up to their `*`.
    pub fn parse_stream(&mut self, cursor: &mut LineCursor) -> Rs274xResult<ParseSummary> {
        loop {
            match cursor.peek() {
                None => {
                    if !cursor.refill()? {
                        break;
                    }
                }
                Some(b'%') => self.parse_extended_block(cursor)?,
                Some(b' ' | b'\t' | b'\r' | b'\n') => cursor.advance(),
                Some(_) => {
                    if !self.skip_data_block(cursor)? {
                        warn!("file ends inside a data block");
                        break;
                    }
                }
            }
        }
        debug!(summary = ?self.summary, "parse finished");
        Ok(self.summary)
    }

    /// Returns `false` if the stream ended before the block's `*`
    fn skip_data_block(&mut self, cursor: &mut LineCursor) -> Rs274xResult<bool> {
        if !skip_to_block_end(cursor)? {
            return Ok(false);
        }
        if cursor.peek() == Some(b'*') {
            cursor.advance();
            self.summary.data_blocks += 1;
        }
        Ok(true)
    }

    /// Parse one extended command block.
    ///
    /// The cursor must sit on the opening `%`; on success it is left just
    /// past the closing `%`.
    pub fn parse_extended_block(&mut self, cursor: &mut LineCursor) -> Rs274xResult<()> {
        if cursor.peek() != Some(b'%') {
            return Err(Rs274xError::NotAtBlockStart);
        }
        cursor.advance();
        self.summary.extended_blocks += 1;

        loop {
            while let Some(b) = cursor.peek() {
                match b {
                    b'%' => {
                        cursor.advance();
                        return Ok(());
                    }
                    b' ' | b'\t' | b'\r' | b'\n' | b'*' => cursor.advance(),
                    _ => {
                        let code = read_command_code(cursor);
                        self.execute_command(code, cursor)?;
                    }
                }
            }
            if !cursor.refill()? {
                return Err(Rs274xError::UnexpectedEof);
            }
        }
    }

    /// Dispatch one command whose two code characters were just read,
    /// then resynchronise on the next `*` or `%`.
    ///
    /// `code` is `None` when the line ended before two characters could
    /// be read. Handler failures come back as
    /// [`CommandOutcome::Failed`]; an `Err` means the input ran out.
    pub fn execute_command(
        &mut self,
        code: Option<[u8; 2]>,
        cursor: &mut LineCursor,
    ) -> Rs274xResult<CommandOutcome> {
        let outcome = match code {
            None => CommandOutcome::Failed(CommandError::MalformedToken {
                command: "?".to_string(),
                reason: "incomplete command code".to_string(),
            }),
            Some([a, b]) => match CommandCode::decode(a, b) {
                Some(command) => {
                    trace!(%command, "dispatch");
                    self.dispatch(command, cursor)?
                }
                None => CommandOutcome::Failed(CommandError::UnknownCommand(
                    String::from_utf8_lossy(&[a, b]).into_owned(),
                )),
            },
        };
        self.record(&outcome);

        if !skip_to_block_end(cursor)? {
            return Err(Rs274xError::UnexpectedEof);
        }
        Ok(outcome)
    }

    fn record(&mut self, outcome: &CommandOutcome) {
        self.summary.commands += 1;
        match outcome {
            CommandOutcome::Applied => {}
            CommandOutcome::Ignored => self.summary.ignored_commands += 1,
            CommandOutcome::Failed(err) => {
                self.summary.failed_commands += 1;
                let level = match err {
                    CommandError::IncludeDepthExceeded { .. }
                    | CommandError::IncludeNotFound { .. } => MessageLevel::Error,
                    _ => MessageLevel::Warning,
                };
                self.messages.push(Message::new(level, err.to_string()));
            }
        }
    }

    fn dispatch(
        &mut self,
        command: CommandCode,
        cursor: &mut LineCursor,
    ) -> Rs274xResult<CommandOutcome> {
        let result = match command {
            CommandCode::FormatStatement => self.format_statement(cursor),
            CommandCode::AxisSelect | CommandCode::MirrorImage => {
                Err(CommandError::Unsupported(command))
            }
            CommandCode::ModeOfUnits => self.mode_of_units(cursor),
            CommandCode::Offset => self.offset(cursor),
            CommandCode::ScaleFactor
            | CommandCode::ImageJustify
            | CommandCode::ImageRotation
            | CommandCode::ImageOffset
            | CommandCode::PlotterFilm
            | CommandCode::Knockout
            | CommandCode::StepAndRepeat
            | CommandCode::Rotate => return Ok(self.ignore(command)),
            CommandCode::LayerName => {
                self.image.layer_name = Some(read_text(cursor));
                return Ok(self.ignore(command));
            }
            CommandCode::ImageName => {
                self.image.name = read_text(cursor);
                Ok(())
            }
            CommandCode::ImagePolarity => {
                let negative = cursor
                    .remaining()
                    .get(..3)
                    .is_some_and(|s| s.eq_ignore_ascii_case(b"NEG"));
                self.image.image_polarity = polarity(negative);
                Ok(())
            }
            CommandCode::LayerPolarity => {
                self.image.layer_polarity = polarity(cursor.peek() == Some(b'C'));
                Ok(())
            }
            CommandCode::ApertureMacro => {
                let am = read_macro(cursor)?;
                self.insert_macro(am);
                Ok(())
            }
            CommandCode::IncludeFile => self.include_file(cursor),
            CommandCode::ApertureDefinition => self.aperture_definition(cursor),
        };

        Ok(match result {
            Ok(()) => CommandOutcome::Applied,
            Err(err) => CommandOutcome::Failed(err),
        })
    }

    fn ignore(&mut self, command: CommandCode) -> CommandOutcome {
        self.messages.push(Message::new(
            MessageLevel::Info,
            format!("Command <{}> ignored", command),
        ));
        CommandOutcome::Ignored
    }

    /// `%FS[L|T][A|I][Nn]XidYid*%`
    fn format_statement(&mut self, cursor: &mut LineCursor) -> CommandResult<()> {
        let command = CommandCode::FormatStatement;
        let format = &mut self.image.format;
        loop {
            match cursor.peek() {
                Some(b'*') => return Ok(()),
                Some(b' ') => cursor.advance(),
                Some(b'L') => {
                    format.zero_suppression = ZeroSuppression::Leading;
                    cursor.advance();
                }
                Some(b'T') => {
                    format.zero_suppression = ZeroSuppression::Trailing;
                    cursor.advance();
                }
                Some(b'A') => {
                    format.notation = CoordinateNotation::Absolute;
                    cursor.advance();
                }
                Some(b'I') => {
                    format.notation = CoordinateNotation::Incremental;
                    cursor.advance();
                }
                Some(b'N') => {
                    cursor.advance();
                    let digits = take_digit(cursor)
                        .ok_or_else(|| CommandError::malformed(command, "N needs a digit"))?;
                    format.sequence_digits = Some(digits);
                }
                Some(axis @ (b'X' | b'Y')) => {
                    cursor.advance();
                    let (integer, decimal) = take_digit(cursor)
                        .zip(take_digit(cursor))
                        .ok_or_else(|| {
                            CommandError::malformed(
                                command,
                                format!("{} needs two digits", axis as char),
                            )
                        })?;
                    let target = if axis == b'X' {
                        &mut format.x
                    } else {
                        &mut format.y
                    };
                    target.integer_digits = integer;
                    target.decimal_digits = decimal;
                }
                Some(other) => {
                    return Err(CommandError::malformed(
                        command,
                        format!("unexpected '{}'", other as char),
                    ))
                }
                None => return Err(CommandError::malformed(command, "missing '*'")),
            }
        }
    }

    /// `%MOIN*%` or `%MOMM*%`
    fn mode_of_units(&mut self, cursor: &mut LineCursor) -> CommandResult<()> {
        let command = CommandCode::ModeOfUnits;
        let raw = read_command_code(cursor)
            .ok_or_else(|| CommandError::malformed(command, "missing units"))?;
        let units: Units = String::from_utf8_lossy(&raw)
            .parse()
            .map_err(|e: gerbkit_core::Error| CommandError::malformed(command, e.to_string()))?;
        self.image.units = units;
        debug!(%units, scale = self.conversion_scale(), "units changed");
        Ok(())
    }

    /// `%OFA<x>B<y>*%`, values in current units
    fn offset(&mut self, cursor: &mut LineCursor) -> CommandResult<()> {
        let command = CommandCode::Offset;
        let units = self.image.units;
        let ppi = self.config.internal_units_per_inch;
        self.image.offset = IntPoint::default();
        loop {
            match cursor.peek() {
                Some(b'*') => return Ok(()),
                Some(b' ') => cursor.advance(),
                Some(b'A') => {
                    cursor.advance();
                    self.image.offset.x = units.to_internal(read_double(cursor), ppi);
                }
                Some(b'B') => {
                    cursor.advance();
                    self.image.offset.y = units.to_internal(read_double(cursor), ppi);
                }
                Some(other) => {
                    return Err(CommandError::malformed(
                        command,
                        format!("unexpected '{}'", other as char),
                    ))
                }
                None => return Err(CommandError::malformed(command, "missing '*'")),
            }
        }
    }

    /// `%IF<name>*%`: continue reading from the named file
    fn include_file(&mut self, cursor: &mut LineCursor) -> CommandResult<()> {
        let max = self.config.max_include_depth;
        if cursor.include_depth() >= max {
            return Err(CommandError::IncludeDepthExceeded { max });
        }
        let name = read_text(cursor).trim().to_string();
        match self.resolver.open(&name) {
            Ok(reader) => {
                cursor.push_stream(reader);
                debug!(%name, depth = cursor.include_depth(), "include file opened");
                Ok(())
            }
            Err(e) => {
                debug!(%name, error = %e, "include file open failed");
                Err(CommandError::IncludeNotFound { name })
            }
        }
    }

    /// `%ADD<n><shape>,<modifiers>*%`
    fn aperture_definition(&mut self, cursor: &mut LineCursor) -> CommandResult<()> {
        if cursor.peek() != Some(b'D') {
            return Err(CommandError::MissingDcodePrefix);
        }
        cursor.advance();
        let dcode = read_int(cursor);
        if self.apertures.get(dcode).is_none() {
            debug!(dcode, "aperture outside the D-code table, skipped");
            return Ok(());
        }

        let units = self.image.units;
        let ppi = self.config.internal_units_per_inch;
        let conv = |v: f64| units.to_internal(v, ppi);

        let standard = cursor
            .peek()
            .and_then(ApertureShape::from_letter)
            .filter(|_| cursor.peek_at(1) == Some(b','));

        let mut def = ApertureDefinition::new(dcode);
        match standard {
            Some(shape) => {
                cursor.advance_by(2);
                def.shape = shape;
                def.size = IntPoint::splat(conv(read_double(cursor)));
                match shape {
                    ApertureShape::Circle => {
                        if take_modifier(cursor, b'X') {
                            def.drill = IntPoint::splat(conv(read_double(cursor)));
                            def.drill_shape = DrillShape::Round;
                        }
                        if take_modifier(cursor, b'X') {
                            def.drill.y = conv(read_double(cursor));
                            def.drill_shape = DrillShape::Slot;
                        }
                    }
                    ApertureShape::Rectangle | ApertureShape::Oval => {
                        if take_modifier(cursor, b'X') {
                            def.size.y = conv(read_double(cursor));
                        }
                        if take_modifier(cursor, b'X') {
                            def.drill = IntPoint::splat(conv(read_double(cursor)));
                            def.drill_shape = DrillShape::Round;
                        }
                        if take_modifier(cursor, b'Y') {
                            def.drill.y = conv(read_double(cursor));
                            def.drill_shape = DrillShape::Slot;
                        }
                    }
                    ApertureShape::Polygon => {
                        if take_modifier(cursor, b'X') {
                            def.vertices = Some(read_double(cursor).max(0.0) as u32);
                        }
                        if take_modifier(cursor, b'X') {
                            def.rotation = Some(read_double(cursor));
                        }
                        if take_modifier(cursor, b'X') {
                            def.drill = IntPoint::splat(conv(read_double(cursor)));
                            def.drill_shape = DrillShape::Round;
                        }
                    }
                    ApertureShape::Macro => {}
                }
            }
            None => {
                let name = read_aperture_name(cursor);
                if !self.macros.contains(&name) {
                    self.messages.warning(format!(
                        "Aperture D{} uses undefined macro <{}>",
                        dcode, name
                    ));
                    return Ok(());
                }
                def.shape = ApertureShape::Macro;
                if cursor.peek() == Some(b',') {
                    cursor.advance();
                    loop {
                        def.macro_params.push(read_double(cursor));
                        if cursor.peek() != Some(b'X') {
                            break;
                        }
                        cursor.advance();
                    }
                }
                def.macro_name = Some(name);
            }
        }

        def.defined = true;
        trace!(dcode, shape = ?def.shape, size = %def.size, "aperture defined");
        if let Some(slot) = self.apertures.get_mut(dcode) {
            *slot = def;
        }
        Ok(())
    }

    fn insert_macro(&mut self, am: ApertureMacro) {
        let name = am.name.clone();
        debug!(%name, primitives = am.primitives.len(), "aperture macro defined");
        if self.macros.insert(am).is_some() {
            self.messages
                .warning(format!("Aperture macro <{}> redefined", name));
        }
    }
}

fn polarity(negative: bool) -> Polarity {
    if negative {
        Polarity::Negative
    } else {
        Polarity::Positive
    }
}

/// Verbatim text up to the end of the block or line
fn read_text(cursor: &mut LineCursor) -> String {
    let mut text = Vec::new();
    while let Some(b) = cursor.peek() {
        if matches!(b, b'*' | b'%' | b'\r' | b'\n') {
            break;
        }
        text.push(b);
        cursor.advance();
    }
    String::from_utf8_lossy(&text).into_owned()
}

/// Macro name in an aperture definition, up to `,` or `*`
fn read_aperture_name(cursor: &mut LineCursor) -> String {
    let mut name = Vec::new();
    while let Some(b) = cursor.peek() {
        if matches!(b, b',' | b'*' | b'%' | b'\r' | b'\n') {
            break;
        }
        name.push(b);
        cursor.advance();
    }
    String::from_utf8_lossy(&name).into_owned()
}

fn take_digit(cursor: &mut LineCursor) -> Option<u8> {
    let b = cursor.peek().filter(u8::is_ascii_digit)?;
    cursor.advance();
    Some(b - b'0')
}

/// Skip spaces, then consume `letter` if it is next
fn take_modifier(cursor: &mut LineCursor, letter: u8) -> bool {
    while cursor.peek() == Some(b' ') {
        cursor.advance();
    }
    if cursor.peek() == Some(letter) {
        cursor.advance();
        true
    } else {
        false
    }
}
