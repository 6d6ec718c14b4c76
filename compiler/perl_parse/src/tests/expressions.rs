use pretty_assertions::assert_eq;

use super::parse_ok;

fn expr(source: &str) -> String {
    parse_ok(source).stmt(0)
}

// === Precedence ===

#[test]
fn multiplication_binds_tighter() {
    assert_eq!(
        expr("1 + 2 * 3;"),
        "(ExprStmt (BinaryExpr NumberLit (BinaryExpr NumberLit NumberLit)))"
    );
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(
        expr("$a - $b - $c;"),
        "(ExprStmt (BinaryExpr (BinaryExpr ScalarVar:a ScalarVar:b) ScalarVar:c))"
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(
        expr("$a = $b = 1;"),
        "(ExprStmt (AssignExpr ScalarVar:a (AssignExpr ScalarVar:b NumberLit)))"
    );
}

#[test]
fn word_operators_bind_below_assignment() {
    assert_eq!(
        expr("$x = $y || 0 and die;"),
        "(ExprStmt (BinaryExpr (AssignExpr ScalarVar:x (BinaryExpr ScalarVar:y NumberLit)) \
         Call:die))"
    );
}

#[test]
fn ternary() {
    assert_eq!(
        expr("$a ? 1 : 2;"),
        "(ExprStmt (TernaryExpr ScalarVar:a NumberLit NumberLit))"
    );
}

#[test]
fn list_assignment() {
    assert_eq!(
        expr("my ($a, $b) = @_;"),
        "(ExprStmt (AssignExpr (VarDecl (ParenList (ListExpr ScalarVar:a ScalarVar:b))) \
         ArrayVar:_))"
    );
}

#[test]
fn binding_a_match() {
    assert_eq!(
        expr("$x =~ /foo/;"),
        "(ExprStmt (BinaryExpr ScalarVar:x RegexMatch))"
    );
}

// === Variables and subscripts ===

#[test]
fn elements_are_named_by_their_container() {
    assert_eq!(
        expr("$a[0] + $h{key};"),
        "(ExprStmt (BinaryExpr (ArrayElement:a NumberLit) (HashElement:h Bareword:key)))"
    );
}

#[test]
fn arrow_chain() {
    assert_eq!(
        expr("$x->{a}[0]->method(1);"),
        "(ExprStmt (MethodCall:method \
         (DerefArrayElement (DerefHashElement ScalarVar:x Bareword:a) NumberLit) \
         (Args NumberLit)))"
    );
}

#[test]
fn dynamic_method_and_code_call() {
    assert_eq!(
        expr("$obj->$method();"),
        "(ExprStmt (MethodCall ScalarVar:obj ScalarVar:method Args))"
    );
    assert_eq!(
        expr("$code->(1);"),
        "(ExprStmt (CodeCall ScalarVar:code (Args NumberLit)))"
    );
}

#[test]
fn slices() {
    assert_eq!(expr("@h{qw(a b)};"), "(ExprStmt (HashSlice:h QwList))");
    assert_eq!(
        expr("@a[1, 2];"),
        "(ExprStmt (ArraySlice:a (ListExpr NumberLit NumberLit)))"
    );
    assert_eq!(
        expr("(stat $f)[7];"),
        "(ExprStmt (ArraySlice (ParenList (Call:stat (Args ScalarVar:f))) NumberLit))"
    );
}

#[test]
fn casts() {
    assert_eq!(expr("@{$r};"), "(ExprStmt (Cast ScalarVar:r))");
    assert_eq!(expr("%$h;"), "(ExprStmt (Cast ScalarVar:h))");
    assert_eq!(
        expr("$$r[0];"),
        "(ExprStmt (DerefArrayElement ScalarVar:r NumberLit))"
    );
    assert_eq!(
        expr("${$r}{key};"),
        "(ExprStmt (DerefHashElement ScalarVar:r Bareword:key))"
    );
}

#[test]
fn dashed_hash_key() {
    assert_eq!(
        expr("$h{-foo};"),
        "(ExprStmt (HashElement:h (UnaryExpr Bareword:foo)))"
    );
}

#[test]
fn postfix_increment() {
    assert_eq!(expr("$i++;"), "(ExprStmt (PostfixExpr ScalarVar:i))");
}

// === Literals ===

#[test]
fn interpolation_produces_variable_nodes() {
    assert_eq!(
        expr("\"hello $name\";"),
        "(ExprStmt (StringLit ScalarVar:name))"
    );
}

#[test]
fn interpolated_expression_blocks() {
    assert_eq!(
        expr("\"n=${\\ $x}\";"),
        "(ExprStmt (StringLit (Cast (RefExpr ScalarVar:x))))"
    );
    assert_eq!(
        expr("\"@{[ $a, 2 ]} and ${$r}\";"),
        "(ExprStmt (StringLit (Cast (AnonArray (ListExpr ScalarVar:a NumberLit))) \
         (Cast ScalarVar:r)))"
    );
}

#[test]
fn quote_like_kinds() {
    assert_eq!(expr("qr/\\d+/i;"), "(ExprStmt RegexQr)");
    assert_eq!(expr("s/a/b/g;"), "(ExprStmt RegexSubst)");
    assert_eq!(expr("qw(a b);"), "(ExprStmt QwList)");
    assert_eq!(expr("'plain';"), "(ExprStmt StringLit)");
}

#[test]
fn anonymous_constructors() {
    assert_eq!(
        expr("my $h = {a => 1};"),
        "(ExprStmt (AssignExpr (VarDecl ScalarVar:h) (AnonHash (ListExpr Bareword:a NumberLit))))"
    );
    assert_eq!(
        expr("[1, 2];"),
        "(ExprStmt (AnonArray (ListExpr NumberLit NumberLit)))"
    );
    assert_eq!(expr("\\@list;"), "(ExprStmt (RefExpr ArrayVar:list))");
    assert_eq!(
        expr("sub { 1 };"),
        "(ExprStmt (AnonSub (Block (ExprStmt NumberLit))))"
    );
    assert_eq!(
        expr("do { 1 };"),
        "(ExprStmt (DoBlock (Block (ExprStmt NumberLit))))"
    );
}

#[test]
fn readline_and_file_tests() {
    assert_eq!(expr("<STDIN>;"), "(ExprStmt ReadLine)");
    assert_eq!(expr("-e $file;"), "(ExprStmt (UnaryExpr ScalarVar:file))");
    assert_eq!(expr("not $x;"), "(ExprStmt (UnaryExpr ScalarVar:x))");
}

// === Calls and barewords ===

#[test]
fn parenthesised_call() {
    assert_eq!(
        expr("foo(1, 2);"),
        "(ExprStmt (Call:foo (Args (ListExpr NumberLit NumberLit))))"
    );
}

#[test]
fn list_operator_takes_the_rest() {
    assert_eq!(
        expr("push @list, $x;"),
        "(ExprStmt (Call:push (Args (ListExpr ArrayVar:list ScalarVar:x))))"
    );
    assert_eq!(
        expr("Dumper $x;"),
        "(ExprStmt (Call:Dumper (Args ScalarVar:x)))"
    );
}

#[test]
fn named_unary_binds_tighter_than_logic() {
    assert_eq!(
        expr("defined $x && $y;"),
        "(ExprStmt (BinaryExpr (Call:defined (Args ScalarVar:x)) ScalarVar:y))"
    );
}

#[test]
fn nullary_builtins_take_no_arguments() {
    assert_eq!(
        expr("time - $start;"),
        "(ExprStmt (BinaryExpr Call:time ScalarVar:start))"
    );
    assert_eq!(
        expr("my $self = shift;"),
        "(ExprStmt (AssignExpr (VarDecl ScalarVar:self) Call:shift))"
    );
    assert_eq!(
        expr("shift->{name};"),
        "(ExprStmt (DerefHashElement Call:shift Bareword:name))"
    );
}

#[test]
fn print_filehandles() {
    assert_eq!(
        expr("print STDERR \"hi\";"),
        "(ExprStmt (Call:print (Args Bareword:STDERR StringLit)))"
    );
    assert_eq!(
        expr("print $fh \"hi\";"),
        "(ExprStmt (Call:print (Args ScalarVar:fh StringLit)))"
    );
    assert_eq!(
        expr("print {$fh} \"hi\";"),
        "(ExprStmt (Call:print (Args (Block (ExprStmt ScalarVar:fh)) StringLit)))"
    );
    assert_eq!(
        expr("print $x;"),
        "(ExprStmt (Call:print (Args ScalarVar:x)))"
    );
}

#[test]
fn block_list_operators() {
    assert_eq!(
        expr("map { $_ * 2 } @list;"),
        "(ExprStmt (Call:map (Args (Block (ExprStmt (BinaryExpr ScalarVar:_ NumberLit))) \
         ArrayVar:list)))"
    );
}

#[test]
fn class_names_and_methods() {
    assert_eq!(
        expr("Foo::Bar->new(x => 1);"),
        "(ExprStmt (MethodCall:new Bareword:Foo::Bar (Args (ListExpr Bareword:x NumberLit))))"
    );
    assert_eq!(
        expr("new Foo(1);"),
        "(ExprStmt (MethodCall:new Bareword:Foo (Args NumberLit)))"
    );
    assert_eq!(
        expr("my $c = Foo::Bar;"),
        "(ExprStmt (AssignExpr (VarDecl ScalarVar:c) Bareword:Foo::Bar))"
    );
    assert_eq!(
        expr("__PACKAGE__->new;"),
        "(ExprStmt (MethodCall:new CurrentPackage:main))"
    );
}

#[test]
fn words_before_fat_comma_are_strings() {
    assert_eq!(
        expr("foo(-bar => 1);"),
        "(ExprStmt (Call:foo (Args (ListExpr (UnaryExpr Bareword:bar) NumberLit))))"
    );
    assert_eq!(
        expr("(if => 1);"),
        "(ExprStmt (ParenList (ListExpr Bareword:if NumberLit)))"
    );
}

#[test]
fn return_takes_a_list() {
    assert_eq!(
        expr("return $x ? 1 : 0;"),
        "(ExprStmt (Return (TernaryExpr ScalarVar:x NumberLit NumberLit)))"
    );
    assert_eq!(
        expr("return bless {}, $class;"),
        "(ExprStmt (Return (Call:bless (Args (ListExpr AnonHash ScalarVar:class)))))"
    );
}
