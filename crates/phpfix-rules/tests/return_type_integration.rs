//! End-to-end tests for the `phpdoc-to-return-type` rule over realistic
//! source files.
//!
//! Unit tests cover each stage in isolation; these tests run the full rule
//! through [`RuleSet::apply_all`] and check whole-file output, idempotence
//! and the re-lex soundness invariant.

use phpfix_lex::{PhpVersion, TokenStream};
use phpfix_rules::{PhpdocToReturnType, ReturnTypeConfig, RuleSet, UnionSkipPolicy};

fn rules(version: PhpVersion) -> RuleSet {
    let mut set = RuleSet::new();
    set.register(Box::new(PhpdocToReturnType::new(ReturnTypeConfig {
        php_version: version,
        union_skip_policy: UnionSkipPolicy::PerMember,
    })));
    set
}

fn fix(source: &str, version: PhpVersion) -> String {
    let mut stream = TokenStream::from_source(source).unwrap();
    rules(version).apply_all(&mut stream);
    stream.to_source()
}

const SERVICE_CLASS: &str = r#"<?php

namespace App\Service;

final class UserService
{
    /** @var UserRepository */
    private $repository;

    /**
     * @param UserRepository $repository
     */
    public function __construct($repository)
    {
        $this->repository = $repository;
    }

    /**
     * @param int $id
     * @return User|null
     */
    public function find($id)
    {
        return $this->repository->find($id);
    }

    /**
     * @return User[]
     */
    public function all()
    {
        return $this->repository->all();
    }

    /**
     * @return int|string
     */
    public function idOf(User $user)
    {
        return $user->id();
    }

    /**
     * @return void
     */
    public function flush()
    {
        $this->repository->flush();
    }

    /**
     * @return resource
     */
    public function handle()
    {
        return $this->stream;
    }

    public function untouched()
    {
        return 42;
    }
}
"#;

#[test]
fn service_class_gets_expected_declarations() {
    let out = fix(SERVICE_CLASS, PhpVersion::V8_0);

    // Constructor keeps its language-mandated signature.
    assert!(out.contains("public function __construct($repository)\n"));
    // Nullable common type, not a union.
    assert!(out.contains("public function find($id): ?User\n"));
    // Array-of collapses to array.
    assert!(out.contains("public function all(): array\n"));
    // Union, members in annotation order.
    assert!(out.contains("public function idOf(User $user): int|string\n"));
    // Plain void.
    assert!(out.contains("public function flush(): void\n"));
    // Skip-listed resource stays untyped.
    assert!(out.contains("public function handle()\n"));
    // No docblock, no change.
    assert!(out.contains("public function untouched()\n"));
}

#[test]
fn pre_union_target_declines_only_the_union() {
    let out = fix(SERVICE_CLASS, PhpVersion::V7_4);
    assert!(out.contains("public function find($id): ?User\n"));
    assert!(out.contains("public function flush(): void\n"));
    // Unions need 8.0.
    assert!(out.contains("public function idOf(User $user)\n"));
}

#[test]
fn full_pass_is_idempotent() {
    let once = fix(SERVICE_CLASS, PhpVersion::V8_0);
    let twice = fix(&once, PhpVersion::V8_0);
    assert_eq!(twice, once);
}

#[test]
fn mutated_output_relexes_to_identical_source() {
    let out = fix(SERVICE_CLASS, PhpVersion::V8_0);
    let relexed = TokenStream::from_source(&out).unwrap();
    assert_eq!(relexed.to_source(), out);
}

#[test]
fn interface_methods_are_typed_before_the_semicolon() {
    let src = "<?php\ninterface Clock\n{\n    /**\n     * @return \\DateTimeImmutable\n     */\n    public function now();\n}\n";
    let out = fix(src, PhpVersion::V8_0);
    assert!(out.contains("public function now(): \\DateTimeImmutable;"));
}

#[test]
fn trait_with_mixed_eligibility() {
    let src = "<?php\ntrait Cache\n{\n    /**\n     * @return static\n     */\n    public function fresh()\n    {\n        return clone $this;\n    }\n\n    /**\n     * @return int\n     * @return string\n     */\n    public function confused()\n    {\n        return 1;\n    }\n}\n";
    let out = fix(src, PhpVersion::V8_0);
    assert!(out.contains("public function fresh(): static\n"));
    // Conflicting annotations: never guess.
    assert!(out.contains("public function confused()\n"));
}

#[test]
fn html_template_with_embedded_php() {
    let src = "<h1>Report</h1>\n<?php\n/** @return string */\nfunction title() { return 'x'; }\n?>\n<p><?= title() ?></p>\n";
    let out = fix(src, PhpVersion::V8_0);
    assert!(out.contains("function title(): string {"));
    assert!(out.starts_with("<h1>Report</h1>\n"));
    assert!(out.ends_with("<p><?= title() ?></p>\n"));
}

#[test]
fn stream_without_functions_is_skipped_entirely() {
    let src = "<?php $config = ['a' => 1];\n";
    let mut stream = TokenStream::from_source(src).unwrap();
    let outcomes = rules(PhpVersion::V8_0).apply_all(&mut stream);
    assert_eq!(stream.to_source(), src);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].report.mutations, 0);
    assert!(outcomes[0].report.declines.is_empty());
}
