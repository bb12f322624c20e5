//! Generate test scene files programmatically
//!
//! Writes small OBJ and COLLADA scenes for the CLI tests.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::Path;

/// Unit quad in the XY plane, one face with four corners
pub fn generate_quad_obj(path: &Path) -> io::Result<()> {
    fs::write(
        path,
        "# quad\n\
         v 0 0 0\n\
         v 1 0 0\n\
         v 1 1 0\n\
         v 0 1 0\n\
         usemtl tiles\n\
         f 1 2 3 4\n",
    )
}

/// Two objects; split into two meshes only with `--multiple`
pub fn generate_two_object_obj(path: &Path) -> io::Result<()> {
    fs::write(
        path,
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\n\
         o first\nf 1 2 3\n\
         o second\nf 1 3 4\n",
    )
}

/// One triangle plus a skin binding all three vertices to one of two joints
pub fn generate_skinned_dae(path: &Path) -> io::Result<()> {
    fs::write(
        path,
        r##"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <library_geometries>
    <geometry id="tri">
      <mesh>
        <source id="tri-pos">
          <float_array id="tri-pos-array" count="9">0 0 0 1 0 0 0 1 0</float_array>
          <technique_common>
            <accessor source="#tri-pos-array" count="3" stride="3">
              <param name="X" type="float"/><param name="Y" type="float"/><param name="Z" type="float"/>
            </accessor>
          </technique_common>
        </source>
        <vertices id="tri-verts"><input semantic="POSITION" source="#tri-pos"/></vertices>
        <triangles count="1" material="body">
          <input semantic="VERTEX" source="#tri-verts" offset="0"/>
          <p>0 1 2</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>
  <library_controllers>
    <controller id="tri-skin">
      <skin source="#tri">
        <source id="tri-joints">
          <Name_array id="tri-joints-array" count="2">hip knee</Name_array>
          <technique_common>
            <accessor source="#tri-joints-array" count="2"><param name="JOINT" type="name"/></accessor>
          </technique_common>
        </source>
        <source id="tri-weights">
          <float_array id="tri-weights-array" count="1">1</float_array>
          <technique_common>
            <accessor source="#tri-weights-array" count="1"><param name="WEIGHT" type="float"/></accessor>
          </technique_common>
        </source>
        <joints><input semantic="JOINT" source="#tri-joints"/></joints>
        <vertex_weights count="3">
          <input semantic="JOINT" source="#tri-joints" offset="0"/>
          <input semantic="WEIGHT" source="#tri-weights" offset="1"/>
          <vcount>1 1 1</vcount>
          <v>0 0 1 0 1 0</v>
        </vertex_weights>
      </skin>
    </controller>
  </library_controllers>
</COLLADA>
"##,
    )
}
