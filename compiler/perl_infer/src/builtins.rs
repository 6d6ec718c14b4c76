//! Core builtin functions: signatures, one-line docs and return shapes.

use perl_types::ScalarKind;

/// How a builtin's result relates to its arguments.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BuiltinReturn {
    Scalar(ScalarKind),
    /// A list of scalars of this kind.
    List(ScalarKind),
    /// One element of the array argument (`shift`, `pop`).
    Element,
    /// Elements of the list arguments (`grep`, `sort`).
    Elements,
    /// Values of the hash argument.
    HashValues,
    /// Whatever the block returns, once per element (`map`).
    BlockResults,
    /// The first argument blessed into the second.
    Bless,
    Undef,
    /// Does not return a useful value.
    Unknown,
}

/// A core builtin.
#[derive(Copy, Clone, Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub signature: &'static str,
    pub doc: &'static str,
    pub returns: BuiltinReturn,
}

const fn b(
    name: &'static str,
    signature: &'static str,
    doc: &'static str,
    returns: BuiltinReturn,
) -> Builtin {
    Builtin {
        name,
        signature,
        doc,
        returns,
    }
}

use BuiltinReturn::{
    Bless, BlockResults, Element, Elements, HashValues, List, Scalar, Undef, Unknown,
};
use ScalarKind::{Any, Number as Num, String as Str};

/// All known builtins, sorted by name.
pub static BUILTINS: &[Builtin] = &[
    b("abs", "abs VALUE", "Absolute value.", Scalar(Num)),
    b(
        "atan2",
        "atan2 Y,X",
        "Arctangent of Y/X in the range -PI to PI.",
        Scalar(Num),
    ),
    b(
        "bless",
        "bless REF,CLASSNAME",
        "Turn the referenced thing into an object of CLASSNAME.",
        Bless,
    ),
    b(
        "caller",
        "caller EXPR",
        "Context of the current sub call.",
        List(Any),
    ),
    b(
        "chdir",
        "chdir EXPR",
        "Change the working directory.",
        Scalar(Any),
    ),
    b(
        "chomp",
        "chomp LIST",
        "Remove trailing record separators; returns how many were removed.",
        Scalar(Num),
    ),
    b(
        "chop",
        "chop LIST",
        "Remove the last character; returns it.",
        Scalar(Str),
    ),
    b(
        "chr",
        "chr NUMBER",
        "Character with the given code point.",
        Scalar(Str),
    ),
    b(
        "close",
        "close FILEHANDLE",
        "Close a file, socket or pipe.",
        Scalar(Any),
    ),
    b("cos", "cos EXPR", "Cosine of EXPR in radians.", Scalar(Num)),
    b(
        "defined",
        "defined EXPR",
        "Whether EXPR has a value other than undef.",
        Scalar(Any),
    ),
    b(
        "delete",
        "delete EXPR",
        "Remove hash or array elements.",
        Unknown,
    ),
    b("die", "die LIST", "Raise an exception.", Unknown),
    b(
        "each",
        "each HASH",
        "Next key/value pair of a hash.",
        List(Any),
    ),
    b(
        "eof",
        "eof FILEHANDLE",
        "Whether the next read on FILEHANDLE hits end of file.",
        Scalar(Any),
    ),
    b(
        "exists",
        "exists EXPR",
        "Whether a hash key or array element exists.",
        Scalar(Any),
    ),
    b("exit", "exit EXPR", "Terminate the program.", Unknown),
    b("exp", "exp EXPR", "e to the power of EXPR.", Scalar(Num)),
    b("fc", "fc EXPR", "Casefolded EXPR.", Scalar(Str)),
    b(
        "glob",
        "glob EXPR",
        "Filenames matching a shell pattern.",
        List(Str),
    ),
    b(
        "gmtime",
        "gmtime EXPR",
        "UTC time, as a string in scalar context.",
        Scalar(Str),
    ),
    b(
        "grep",
        "grep BLOCK LIST",
        "Elements of LIST for which BLOCK is true.",
        Elements,
    ),
    b(
        "hex",
        "hex EXPR",
        "Numeric value of a hexadecimal string.",
        Scalar(Num),
    ),
    b(
        "index",
        "index STR,SUBSTR,POSITION",
        "Position of the first SUBSTR in STR.",
        Scalar(Num),
    ),
    b("int", "int EXPR", "Integer part of EXPR.", Scalar(Num)),
    b(
        "join",
        "join EXPR,LIST",
        "LIST joined into one string with EXPR between elements.",
        Scalar(Str),
    ),
    b("keys", "keys HASH", "Keys of a hash.", List(Str)),
    b("lc", "lc EXPR", "Lowercased EXPR.", Scalar(Str)),
    b(
        "lcfirst",
        "lcfirst EXPR",
        "EXPR with its first character lowercased.",
        Scalar(Str),
    ),
    b(
        "length",
        "length EXPR",
        "Length in characters.",
        Scalar(Num),
    ),
    b(
        "localtime",
        "localtime EXPR",
        "Local time, as a string in scalar context.",
        Scalar(Str),
    ),
    b("log", "log EXPR", "Natural logarithm.", Scalar(Num)),
    b(
        "lstat",
        "lstat FILEHANDLE",
        "Like stat, without following symbolic links.",
        List(Any),
    ),
    b(
        "map",
        "map BLOCK LIST",
        "Results of BLOCK for each element of LIST.",
        BlockResults,
    ),
    b(
        "mkdir",
        "mkdir FILENAME,MODE",
        "Create a directory.",
        Scalar(Any),
    ),
    b(
        "oct",
        "oct EXPR",
        "Numeric value of an octal, hex or binary string.",
        Scalar(Num),
    ),
    b(
        "open",
        "open FILEHANDLE,MODE,EXPR",
        "Open a file.",
        Scalar(Any),
    ),
    b(
        "ord",
        "ord EXPR",
        "Code point of the first character.",
        Scalar(Num),
    ),
    b(
        "pop",
        "pop ARRAY",
        "Remove and return the last element.",
        Element,
    ),
    b(
        "pos",
        "pos SCALAR",
        "Offset where the last m//g search left off.",
        Scalar(Num),
    ),
    b("print", "print FILEHANDLE LIST", "Print LIST.", Scalar(Any)),
    b(
        "printf",
        "printf FILEHANDLE FORMAT, LIST",
        "Print a formatted string.",
        Scalar(Any),
    ),
    b(
        "push",
        "push ARRAY,LIST",
        "Append LIST; returns the new length.",
        Scalar(Num),
    ),
    b(
        "quotemeta",
        "quotemeta EXPR",
        "EXPR with regex metacharacters escaped.",
        Scalar(Str),
    ),
    b(
        "rand",
        "rand EXPR",
        "Random number between 0 and EXPR.",
        Scalar(Num),
    ),
    b(
        "readdir",
        "readdir DIRHANDLE",
        "Next directory entry.",
        Scalar(Str),
    ),
    b(
        "readline",
        "readline EXPR",
        "Next line from a filehandle.",
        Scalar(Str),
    ),
    b(
        "ref",
        "ref EXPR",
        "Kind of reference, or the class of an object.",
        Scalar(Str),
    ),
    b(
        "rename",
        "rename OLDNAME,NEWNAME",
        "Rename a file.",
        Scalar(Any),
    ),
    b(
        "reverse",
        "reverse LIST",
        "LIST in reverse order.",
        Elements,
    ),
    b(
        "rindex",
        "rindex STR,SUBSTR,POSITION",
        "Position of the last SUBSTR in STR.",
        Scalar(Num),
    ),
    b(
        "rmdir",
        "rmdir FILENAME",
        "Remove an empty directory.",
        Scalar(Any),
    ),
    b(
        "say",
        "say FILEHANDLE LIST",
        "Print LIST followed by a newline.",
        Scalar(Any),
    ),
    b(
        "scalar",
        "scalar EXPR",
        "EXPR in scalar context.",
        Scalar(Any),
    ),
    b(
        "shift",
        "shift ARRAY",
        "Remove and return the first element.",
        Element,
    ),
    b("sin", "sin EXPR", "Sine of EXPR in radians.", Scalar(Num)),
    b(
        "sleep",
        "sleep EXPR",
        "Sleep for EXPR seconds.",
        Scalar(Num),
    ),
    b("sort", "sort BLOCK LIST", "LIST sorted.", Elements),
    b(
        "splice",
        "splice ARRAY,OFFSET,LENGTH,LIST",
        "Remove and replace array elements.",
        Elements,
    ),
    b(
        "split",
        "split /PATTERN/,EXPR,LIMIT",
        "Split a string into a list of strings.",
        List(Str),
    ),
    b(
        "sprintf",
        "sprintf FORMAT, LIST",
        "Formatted string.",
        Scalar(Str),
    ),
    b("sqrt", "sqrt EXPR", "Square root.", Scalar(Num)),
    b("stat", "stat FILEHANDLE", "File status fields.", List(Any)),
    b(
        "substr",
        "substr EXPR,OFFSET,LENGTH,REPLACEMENT",
        "Part of a string.",
        Scalar(Str),
    ),
    b(
        "system",
        "system LIST",
        "Run a command and wait; returns its exit status.",
        Scalar(Num),
    ),
    b("time", "time", "Seconds since the epoch.", Scalar(Num)),
    b("uc", "uc EXPR", "Uppercased EXPR.", Scalar(Str)),
    b(
        "ucfirst",
        "ucfirst EXPR",
        "EXPR with its first character uppercased.",
        Scalar(Str),
    ),
    b(
        "undef",
        "undef EXPR",
        "Undefine EXPR; returns undef.",
        Undef,
    ),
    b(
        "unlink",
        "unlink LIST",
        "Delete files; returns how many were deleted.",
        Scalar(Num),
    ),
    b(
        "unshift",
        "unshift ARRAY,LIST",
        "Prepend LIST; returns the new length.",
        Scalar(Num),
    ),
    b("values", "values HASH", "Values of a hash.", HashValues),
    b(
        "wantarray",
        "wantarray",
        "Whether the current sub was called in list context.",
        Scalar(Any),
    ),
    b(
        "warn",
        "warn LIST",
        "Print a warning to STDERR.",
        Scalar(Any),
    ),
];

/// Look up a builtin by its unqualified name.
pub fn builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS
        .binary_search_by(|entry| entry.name.cmp(name))
        .ok()
        .map(|i| &BUILTINS[i])
}
