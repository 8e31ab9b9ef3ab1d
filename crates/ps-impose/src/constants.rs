//! Shared constants for page rearrangement
//!
//! Unit conversions, layout defaults and the PostScript fragments that
//! are injected into imposed output.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Points per centimetre
pub const POINTS_PER_CM: f64 = 28.346456692913385211;

/// Points per millimetre
pub const POINTS_PER_MM: f64 = 2.8346456692913385211;

// =============================================================================
// Layout Defaults
// =============================================================================

/// Default maximum wasted area for N-up layouts (square points)
pub const DEFAULT_TOLERANCE: f64 = 100_000.0;

/// Line width used when `--draw` is given without a value (points)
pub const DEFAULT_DRAW_WIDTH: f64 = 1.0;

/// Specification used when none is given: every page, unchanged
pub const IDENTITY_SPEC: &str = "0";

/// Range used when none is given: first page to last page
pub const ALL_PAGES_RANGE: &str = "1-_1";

/// Explanation attached to every malformed page specification
pub const SPEC_USAGE: &str = "bad page specification:

  PAGESPECS = [MODULO:]SPEC
  SPEC      = [-]PAGENO[L|R|U|H|V][@SCALE][(XOFF,YOFF)][,SPEC|+SPEC]
              MODULO >= 1; 0 <= PAGENO < MODULO";

// =============================================================================
// PostScript Procedure Set
// =============================================================================

/// Name tag of the injected procedure set, as it appears after
/// `%%BeginProcSet:`
pub const PROCSET_NAME: &str = "PStoPS";

/// Version written after the procedure set name
pub const PROCSET_VERSION: &str = "1 15";

/// Reusable procedures wrapping `showpage`, `erasepage` and `copypage`,
/// nullifying paper size operators and making `initmatrix`, `initclip`
/// and `initgraphics` relative to the imposed page.
pub const PROCSET: &str = r#"userdict begin
[/showpage/erasepage/copypage]{dup where{pop dup load
 type/operatortype eq{ /PStoPSenablepage cvx 1 index
 load 1 array astore cvx {} bind /ifelse cvx 4 array
 astore cvx def}{pop}ifelse}{pop}ifelse}forall
 /PStoPSenablepage true def
[/letter/legal/executivepage/a4/a4small/b5/com10envelope
 /monarchenvelope/c5envelope/dlenvelope/lettersmall/note
 /folio/quarto/a5]{dup where{dup wcheck{exch{}put}
 {pop{}def}ifelse}{pop}ifelse}forall
/setpagedevice {pop}bind 1 index where{dup wcheck{3 1 roll put}
 {pop def}ifelse}{def}ifelse
/PStoPSmatrix matrix currentmatrix def
/PStoPSxform matrix def/PStoPSclip{clippath}def
/defaultmatrix{PStoPSmatrix exch PStoPSxform exch concatmatrix}bind def
/initmatrix{matrix defaultmatrix setmatrix}bind def
/initclip[{matrix currentmatrix PStoPSmatrix setmatrix
 [{currentpoint}stopped{$error/newerror false put{newpath}}
 {/newpath cvx 3 1 roll/moveto cvx 4 array astore cvx}ifelse]
 {[/newpath cvx{/moveto cvx}{/lineto cvx}
 {/curveto cvx}{/closepath cvx}pathforall]cvx exch pop}
 stopped{$error/errorname get/invalidaccess eq{cleartomark
 $error/newerror false put cvx exec}{stop}ifelse}if}bind aload pop
 /initclip dup load dup type dup/operatortype eq{pop exch pop}
 {dup/arraytype eq exch/packedarraytype eq or
  {dup xcheck{exch pop aload pop}{pop cvx}ifelse}
  {pop cvx}ifelse}ifelse
 {newpath PStoPSclip clip newpath exec setmatrix} bind aload pop]cvx def
/initgraphics{initmatrix newpath initclip 1 setlinewidth
 0 setlinecap 0 setlinejoin []0 setdash 0 setgray
 10 setmiterlimit}bind def
end"#;

/// Records the transform from the original default matrix to the matrix
/// in effect after setup, for documents that did not carry the procedure
/// set already.
pub const SAVE_XFORM: &str = "userdict/PStoPSxform PStoPSmatrix matrix currentmatrix
 matrix invertmatrix matrix concatmatrix
 matrix invertmatrix put";

/// Prefix of the line that ends a page setup written by an earlier
/// imposition run
pub const XFORM_LINE_PREFIX: &[u8] = b"PStoPSxform";
